use crate::parser::StudentRecord;
use super::types::{Group, GROUP_SIZE};

/// Splits students into groups of three in sheet order.
/// The last group keeps whatever remains; nobody is dropped or padded.
pub fn form_groups(students: &[StudentRecord]) -> Vec<Group<'_>> {
    students
        .chunks(GROUP_SIZE)
        .enumerate()
        .map(|(idx, members)| Group {
            group_id: format!("Group{}", idx + 1),
            members,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CellValue;

    fn student(name: &str) -> StudentRecord {
        StudentRecord {
            name: Some(name.to_string()),
            fee_paid_date: CellValue::Missing,
            preferences: Default::default(),
            receipt_ref: None,
        }
    }

    fn students(count: usize) -> Vec<StudentRecord> {
        (1..=count).map(|n| student(&format!("S{}", n))).collect()
    }

    #[test]
    fn chunks_in_threes_with_remainder_last() {
        let roster = students(7);
        let groups = form_groups(&roster);

        let sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(groups[2].members[0].name.as_deref(), Some("S7"));
    }

    #[test]
    fn group_ids_follow_sheet_position() {
        let roster = students(6);
        let ids: Vec<String> = form_groups(&roster)
            .into_iter()
            .map(|g| g.group_id)
            .collect();

        assert_eq!(ids, vec!["Group1", "Group2"]);
    }

    #[test]
    fn group_count_is_ceiling_of_thirds() {
        for count in 0..=10 {
            let roster = students(count);
            let groups = form_groups(&roster);
            assert_eq!(groups.len(), count.div_ceil(GROUP_SIZE));
            if let Some(last) = groups.last() {
                let expected = if count % GROUP_SIZE == 0 { GROUP_SIZE } else { count % GROUP_SIZE };
                assert_eq!(last.members.len(), expected);
            }
        }
    }
}
