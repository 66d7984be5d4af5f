use std::collections::BTreeSet;

use tracing::debug;

use crate::parser::{CellValue, StudentRecord};
use super::priority::PrioritizedGroup;
use super::types::{Allocation, AllotmentRecord, MemberSummary, DATE_DISPLAY_FORMAT, TOTAL_ROOMS};

/// Reads a preference cell as a room number.
/// Only whole numbers within 1..=TOTAL_ROOMS count; anything else is ignored.
pub fn room_number(value: &CellValue) -> Option<u8> {
    let number = match value {
        CellValue::Number(n) if n.fract() == 0.0 => *n as i64,
        CellValue::Text(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (1..=i64::from(TOTAL_ROOMS))
        .contains(&number)
        .then_some(number as u8)
}

/// Collects a group's valid preferences member by member, first occurrence wins
pub fn preference_list(members: &[StudentRecord]) -> Vec<u8> {
    let mut rooms = Vec::new();

    for room in members
        .iter()
        .flat_map(|member| member.preferences.iter())
        .filter_map(room_number)
    {
        if !rooms.contains(&room) {
            rooms.push(room);
        }
    }

    rooms
}

/// First preferred room nobody holds yet
pub fn first_free_room(preferences: &[u8], occupied: &BTreeSet<u8>) -> Option<u8> {
    preferences
        .iter()
        .copied()
        .find(|room| !occupied.contains(room))
}

/// Gives each group, in priority order, the first free room it asked for.
/// Earlier groups are never revisited, so a later group may end up with nothing.
pub fn allocate_rooms(groups: &[PrioritizedGroup<'_>]) -> Allocation {
    let mut occupied_rooms = BTreeSet::new();
    let mut records = Vec::with_capacity(groups.len());

    for prioritized in groups {
        let group = &prioritized.group;
        let preferences = preference_list(group.members);

        let assigned_room = first_free_room(&preferences, &occupied_rooms);
        if let Some(room) = assigned_room {
            occupied_rooms.insert(room);
        }

        debug!(
            group_id = %group.group_id,
            preferences = ?preferences,
            assigned_room = ?assigned_room,
            "allocated group"
        );

        records.push(AllotmentRecord {
            group_id: group.group_id.clone(),
            members: group.members.iter().map(MemberSummary::from_student).collect(),
            earliest_fee_date: prioritized
                .earliest_fee_date
                .map(|date| date.format(DATE_DISPLAY_FORMAT).to_string()),
            assigned_room,
        });
    }

    Allocation {
        records,
        occupied_rooms,
    }
}
