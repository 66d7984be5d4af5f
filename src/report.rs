use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, AllotmentRecord, TOTAL_ROOMS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Occupied,
    Available,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntry {
    pub room_number: u8,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub allocated: usize,
    pub available: usize,
}

/// Occupancy of every room in the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatusView {
    pub total_rooms: u8,
    pub allocated_rooms: Vec<u8>,
    pub available_rooms: Vec<u8>,
    pub rooms: Vec<RoomEntry>,
    pub allocation_summary: AllocationSummary,
}

/// Per-group results of the latest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllotmentDataView {
    pub total_groups: usize,
    pub allocated_rooms_count: usize,
    pub allotment_data: Vec<AllotmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetConfirmation {
    pub message: String,
}

pub fn room_status(allocation: &Allocation) -> RoomStatusView {
    let rooms: Vec<RoomEntry> = (1..=TOTAL_ROOMS)
        .map(|room_number| RoomEntry {
            room_number,
            status: if allocation.occupied_rooms.contains(&room_number) {
                RoomStatus::Occupied
            } else {
                RoomStatus::Available
            },
        })
        .collect();

    let allocated_rooms: Vec<u8> = allocation.occupied_rooms.iter().copied().collect();
    let available_rooms: Vec<u8> = rooms
        .iter()
        .filter(|room| room.status == RoomStatus::Available)
        .map(|room| room.room_number)
        .collect();

    RoomStatusView {
        total_rooms: TOTAL_ROOMS,
        allocation_summary: AllocationSummary {
            allocated: allocated_rooms.len(),
            available: available_rooms.len(),
        },
        allocated_rooms,
        available_rooms,
        rooms,
    }
}

pub fn allotment_data(allocation: &Allocation) -> AllotmentDataView {
    AllotmentDataView {
        total_groups: allocation.records.len(),
        allocated_rooms_count: allocation.occupied_rooms.len(),
        allotment_data: allocation.records.clone(),
    }
}
