pub mod types;
pub mod dates;
pub mod grouping;
pub mod priority;
pub mod rooms;

use tracing::info;

use crate::parser::StudentRecord;

pub use types::{Allocation, AllotmentRecord, MemberSummary, GROUP_SIZE, TOTAL_ROOMS};
pub use dates::parse_fee_date;
pub use grouping::form_groups;
pub use priority::{prioritize_groups, PriorityKey};
pub use rooms::allocate_rooms;

/// Runs a complete allocation over students in sheet order, starting
/// from an empty building
pub fn allot_rooms(students: &[StudentRecord]) -> Allocation {
    let groups = form_groups(students);
    let prioritized = prioritize_groups(groups);
    let allocation = allocate_rooms(&prioritized);

    info!(
        students = students.len(),
        groups = allocation.records.len(),
        allocated = allocation.occupied_rooms.len(),
        unassigned = allocation.unassigned().count(),
        "room allocation complete"
    );

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CellValue;

    fn student(name: &str, fee_paid_date: &str, preferences: [&str; 3]) -> StudentRecord {
        StudentRecord {
            name: Some(name.to_string()),
            fee_paid_date: CellValue::text(fee_paid_date),
            preferences: preferences.map(CellValue::text),
            receipt_ref: None,
        }
    }

    fn rooms_by_group(allocation: &Allocation) -> Vec<(String, Option<u8>)> {
        allocation
            .records
            .iter()
            .map(|r| (r.group_id.clone(), r.assigned_room))
            .collect()
    }

    #[test]
    fn single_group_takes_its_first_preference() {
        let roster = vec![
            student("A", "2024-01-03", ["5", "7", "9"]),
            student("B", "2024-01-01", ["5", "7", "9"]),
            student("C", "2024-01-02", ["5", "7", "9"]),
        ];

        let allocation = allot_rooms(&roster);

        assert_eq!(allocation.records.len(), 1);
        let record = &allocation.records[0];
        assert_eq!(record.earliest_fee_date.as_deref(), Some("2024-01-01"));
        assert_eq!(record.assigned_room, Some(5));
        assert_eq!(record.members[1].fee_paid_date, "2024-01-01");
        assert_eq!(allocation.occupied_rooms.iter().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn earlier_payers_claim_shared_preference() {
        let roster = vec![
            student("A", "2024-02-01", ["10", "11", "12"]),
            student("B", "2024-02-05", ["10", "", ""]),
            student("C", "2024-02-09", ["", "", ""]),
            student("D", "2024-01-15", ["10", "20", "21"]),
            student("E", "2024-01-20", ["", "", ""]),
            student("F", "2024-01-25", ["", "", ""]),
        ];

        let allocation = allot_rooms(&roster);

        assert_eq!(
            rooms_by_group(&allocation),
            vec![
                ("Group2".to_string(), Some(10)),
                ("Group1".to_string(), Some(11)),
            ]
        );
    }

    #[test]
    fn invalid_preferences_leave_group_without_room() {
        let roster = vec![
            student("A", "2024-01-01", ["N/A", "75", ""]),
            student("B", "2024-01-02", ["0", "abc", "3.5"]),
        ];

        let allocation = allot_rooms(&roster);

        assert_eq!(allocation.records[0].assigned_room, None);
        assert!(allocation.occupied_rooms.is_empty());
        assert_eq!(allocation.unassigned().count(), 1);
    }

    #[test]
    fn exhausted_preferences_get_no_fallback_room() {
        let roster = vec![
            student("A", "2024-01-01", ["1", "2", ""]),
            student("B", "", ["", "", ""]),
            student("C", "", ["", "", ""]),
            student("D", "2024-01-02", ["1", "", ""]),
        ];

        let allocation = allot_rooms(&roster);

        assert_eq!(
            rooms_by_group(&allocation),
            vec![("Group1".to_string(), Some(1)), ("Group2".to_string(), None)]
        );
    }

    #[test]
    fn assigned_rooms_are_distinct_and_in_range() {
        let roster: Vec<StudentRecord> = (0..90)
            .map(|n| {
                let a = (n * 7 % 61).to_string();
                let b = (n * 11 % 65).to_string();
                let c = (n % 60 + 1).to_string();
                student(&format!("S{}", n), &format!("2024-03-{:02}", n % 28 + 1), [a.as_str(), b.as_str(), c.as_str()])
            })
            .collect();

        let allocation = allot_rooms(&roster);

        let assigned: Vec<u8> = allocation.records.iter().filter_map(|r| r.assigned_room).collect();
        let distinct: std::collections::BTreeSet<u8> = assigned.iter().copied().collect();
        assert_eq!(assigned.len(), distinct.len());
        assert_eq!(distinct, allocation.occupied_rooms);
        assert!(assigned.iter().all(|room| (1..=TOTAL_ROOMS).contains(room)));
        assert_eq!(allocation.records.len(), 30);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let roster = vec![
            student("A", "", ["4", "5", "6"]),
            student("B", "2024-01-09", ["4", "", ""]),
            student("C", "", ["", "", ""]),
            student("D", "", ["4", "7", ""]),
        ];

        assert_eq!(allot_rooms(&roster), allot_rooms(&roster));
    }
}
