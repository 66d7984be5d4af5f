use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::parser::{CellValue, StudentRecord};
use super::dates::parse_fee_date;

/// Rooms are numbered 1..=TOTAL_ROOMS
pub const TOTAL_ROOMS: u8 = 60;
pub const GROUP_SIZE: usize = 3;

/// Placeholder shown for absent names, dates and receipts
pub const NOT_AVAILABLE: &str = "N/A";

pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Consecutive students from the sheet that are allotted a room together
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub group_id: String,
    pub members: &'a [StudentRecord],
}

/// A group member as shown in allotment output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub name: String,
    pub fee_paid_date: String,
    pub receipt_ref: String,
    pub preference1: CellValue,
    pub preference2: CellValue,
    pub preference3: CellValue,
}

impl MemberSummary {
    pub fn from_student(student: &StudentRecord) -> Self {
        let [preference1, preference2, preference3] = student.preferences.clone();

        MemberSummary {
            name: student
                .name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            fee_paid_date: parse_fee_date(&student.fee_paid_date)
                .map(|date| date.format(DATE_DISPLAY_FORMAT).to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            receipt_ref: student
                .receipt_ref
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            preference1,
            preference2,
            preference3,
        }
    }
}

/// Outcome for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllotmentRecord {
    pub group_id: String,
    pub members: Vec<MemberSummary>,
    pub earliest_fee_date: Option<String>,
    pub assigned_room: Option<u8>,
}

/// Everything a single allocation run produces: records in priority
/// order plus the set of rooms they hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub records: Vec<AllotmentRecord>,
    pub occupied_rooms: BTreeSet<u8>,
}

impl Allocation {
    pub fn unassigned(&self) -> impl Iterator<Item = &AllotmentRecord> {
        self.records.iter().filter(|r| r.assigned_room.is_none())
    }

    pub fn group_in_room(&self, room: u8) -> Option<&AllotmentRecord> {
        self.records.iter().find(|r| r.assigned_room == Some(room))
    }
}
