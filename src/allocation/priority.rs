use chrono::NaiveDateTime;

use crate::parser::StudentRecord;
use super::dates::parse_fee_date;
use super::types::Group;

/// Processing order key. Every dated group sorts before every undated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityKey {
    Dated(NaiveDateTime),
    Undated,
}

/// A group together with the earliest fee date among its members
#[derive(Debug, Clone)]
pub struct PrioritizedGroup<'a> {
    pub group: Group<'a>,
    pub earliest_fee_date: Option<NaiveDateTime>,
}

impl PrioritizedGroup<'_> {
    pub fn priority_key(&self) -> PriorityKey {
        self.earliest_fee_date
            .map(PriorityKey::Dated)
            .unwrap_or(PriorityKey::Undated)
    }
}

/// Earliest parseable fee date among the members, ignoring unparseable ones
pub fn earliest_fee_date(members: &[StudentRecord]) -> Option<NaiveDateTime> {
    members
        .iter()
        .filter_map(|member| parse_fee_date(&member.fee_paid_date))
        .min()
}

/// Orders groups by earliest fee date. Ties keep their sheet order.
pub fn prioritize_groups(groups: Vec<Group<'_>>) -> Vec<PrioritizedGroup<'_>> {
    let mut prioritized: Vec<PrioritizedGroup<'_>> = groups
        .into_iter()
        .map(|group| PrioritizedGroup {
            earliest_fee_date: earliest_fee_date(group.members),
            group,
        })
        .collect();

    // sort_by_key is stable
    prioritized.sort_by_key(|g| g.priority_key());
    prioritized
}
