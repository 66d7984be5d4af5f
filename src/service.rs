use tracing::info;

use crate::allocation::{allot_rooms, Allocation, AllotmentRecord};
use crate::parser::StudentRecord;
use crate::report::{self, AllotmentDataView, ResetConfirmation, RoomStatusView};
use crate::state::AllocationState;

pub const RESET_MESSAGE: &str = "Room allotment data has been reset";

/// Owns the allocation state and is the only way to change it
#[derive(Debug, Default)]
pub struct AllotmentService {
    state: AllocationState,
}

impl AllotmentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a fresh allocation and replaces whatever the previous run left behind
    pub fn allocate(&self, students: &[StudentRecord]) -> Vec<AllotmentRecord> {
        let Allocation {
            records,
            occupied_rooms,
        } = allot_rooms(students);

        self.state.replace_all(records.clone(), occupied_rooms);
        records
    }

    pub fn allotment_data(&self) -> AllotmentDataView {
        report::allotment_data(&self.state.snapshot())
    }

    pub fn room_status(&self) -> RoomStatusView {
        report::room_status(&self.state.snapshot())
    }

    pub fn reset(&self) -> ResetConfirmation {
        self.state.reset();
        info!("room allotment reset");
        ResetConfirmation {
            message: RESET_MESSAGE.to_string(),
        }
    }

    pub fn state(&self) -> &AllocationState {
        &self.state
    }
}
