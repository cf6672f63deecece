use std::collections::HashMap;

use crewline_protocol::SharedStr;

use crate::error::{Result, TimelineError};
use crate::model::ScheduleItem;

/// Assign each half-open interval `[start, end)` the lowest lane whose last
/// interval has already ended.
///
/// Intervals are visited in ascending start order, ties in input order.
/// Returns one lane per input, in input order. The number of lanes used is
/// the largest number of intervals active at any instant.
pub fn pack_intervals(intervals: &[(i64, i64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    // `sort_by_key` is stable, so equal starts keep input order.
    order.sort_by_key(|&i| intervals[i].0);

    let mut lane_ends: Vec<i64> = Vec::new();
    let mut lanes = vec![0; intervals.len()];
    for i in order {
        let (start, end) = intervals[i];
        let lane = match lane_ends.iter().position(|&lane_end| lane_end <= start) {
            Some(free) => {
                lane_ends[free] = end;
                free
            }
            None => {
                lane_ends.push(end);
                lane_ends.len() - 1
            }
        };
        lanes[i] = lane;
    }
    lanes
}

/// Lane per item id, plus the number of lanes each owner needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneAssignment {
    lanes: HashMap<SharedStr, usize>,
    /// Owners in first-seen order with their lane counts.
    owners: Vec<(SharedStr, usize)>,
}

impl LaneAssignment {
    pub fn lane(&self, item_id: &str) -> Option<usize> {
        self.lanes.get(item_id).copied()
    }

    pub fn lane_count(&self, owner_id: &str) -> usize {
        self.owners
            .iter()
            .find(|(owner, _)| owner == owner_id)
            .map_or(0, |(_, count)| *count)
    }

    /// Owners in the order they first appeared in the input.
    pub fn owners(&self) -> impl Iterator<Item = (&SharedStr, usize)> {
        self.owners.iter().map(|(owner, count)| (owner, *count))
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Give every item a lane so that overlapping items of the same owner never
/// share one. Items of different owners are packed independently.
///
/// Fails with [`TimelineError::DuplicateItem`] if two items share an id.
pub fn assign_lanes(items: &[ScheduleItem]) -> Result<LaneAssignment> {
    assign_lanes_with(items, |item| item.span.interval())
}

/// [`assign_lanes`] with a caller-chosen interval per item. The multi-day
/// view packs by whole days, since an hour slot still fills its entire day
/// column there.
pub fn assign_lanes_with<F>(items: &[ScheduleItem], interval: F) -> Result<LaneAssignment>
where
    F: Fn(&ScheduleItem) -> (i64, i64),
{
    let mut groups: Vec<(SharedStr, Vec<&ScheduleItem>)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let idx = *group_index.entry(item.owner_id.as_str()).or_insert_with(|| {
            groups.push((item.owner_id.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(item);
    }

    let mut assignment = LaneAssignment {
        lanes: HashMap::with_capacity(items.len()),
        owners: Vec::with_capacity(groups.len()),
    };

    for (owner, group) in groups {
        let intervals: Vec<(i64, i64)> = group.iter().map(|item| interval(item)).collect();
        let lanes = pack_intervals(&intervals);
        let lane_count = lanes.iter().max().map_or(0, |max| max + 1);

        for (item, lane) in group.iter().zip(lanes) {
            if assignment.lanes.insert(item.id.clone(), lane).is_some() {
                return Err(TimelineError::DuplicateItem(item.id.clone()));
            }
        }
        tracing::trace!(owner = %owner, items = group.len(), lanes = lane_count, "packed owner row");
        assignment.owners.push((owner, lane_count));
    }

    tracing::debug!(
        items = assignment.lanes.len(),
        owners = assignment.owners.len(),
        "assigned lanes"
    );
    Ok(assignment)
}
