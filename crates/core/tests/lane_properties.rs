//! Randomized checks of the lane allocator: no two overlapping items share a
//! lane, and the lane count equals the peak number of concurrent items.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

use crewline_core::layout::{assign_lanes, pack_intervals};
use crewline_core::model::{ItemSpan, ScheduleItem, Status, TimeRange};

fn random_intervals(rng: &mut StdRng, count: usize) -> Vec<(i64, i64)> {
    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..1400);
            let len = rng.gen_range(1..=180);
            (start, (start + len).min(1440))
        })
        .collect()
}

/// Peak concurrency by sweeping sorted endpoints. An end at `t` is
/// processed before a start at `t`, matching half-open intervals.
fn max_overlap(intervals: &[(i64, i64)]) -> usize {
    let mut events: Vec<(i64, i32)> = intervals
        .iter()
        .flat_map(|&(start, end)| [(start, 1), (end, -1)])
        .collect();
    events.sort();
    let mut active = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        active += delta;
        peak = peak.max(active);
    }
    peak as usize
}

#[rstest]
#[case(1, 5)]
#[case(7, 20)]
#[case(42, 60)]
#[case(1234, 150)]
#[case(98765, 400)]
fn lane_count_matches_peak_overlap(#[case] seed: u64, #[case] count: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let intervals = random_intervals(&mut rng, count);
    let lanes = pack_intervals(&intervals);

    let used = lanes.iter().max().map_or(0, |max| max + 1);
    assert_eq!(used, max_overlap(&intervals), "seed {seed}");

    for (i, a) in intervals.iter().enumerate() {
        for (j, b) in intervals.iter().enumerate().skip(i + 1) {
            if lanes[i] == lanes[j] {
                assert!(
                    a.1 <= b.0 || b.1 <= a.0,
                    "seed {seed}: {a:?} and {b:?} share lane {}",
                    lanes[i]
                );
            }
        }
    }
}

#[rstest]
#[case(3)]
#[case(11)]
#[case(2024)]
fn items_of_one_owner_never_overlap_in_a_lane(#[case] seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let owners = ["e-1", "e-2", "e-3"];
    let items: Vec<ScheduleItem> = random_intervals(&mut rng, 90)
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| ScheduleItem {
            id: format!("t{i}").into(),
            owner_id: owners[i % owners.len()].into(),
            span: ItemSpan::Hours {
                date,
                range: TimeRange::new(start as u32, end as u32).unwrap(),
            },
            label: format!("task {i}").into(),
            status: Status::Pending,
        })
        .collect();

    let assignment = assign_lanes(&items).unwrap();
    for owner in owners {
        let mine: Vec<&ScheduleItem> = items.iter().filter(|i| i.owner_id == owner).collect();
        let intervals: Vec<(i64, i64)> = mine.iter().map(|i| i.span.interval()).collect();
        assert_eq!(assignment.lane_count(owner), max_overlap(&intervals));

        for (x, a) in mine.iter().enumerate() {
            for b in mine.iter().skip(x + 1) {
                if assignment.lane(&a.id) == assignment.lane(&b.id) {
                    let (a0, a1) = a.span.interval();
                    let (b0, b1) = b.span.interval();
                    assert!(a1 <= b0 || b1 <= a0, "{} and {} overlap", a.id, b.id);
                }
            }
        }
    }
}

#[test]
fn back_to_back_chain_uses_one_lane() {
    let chain: Vec<(i64, i64)> = (0..24).map(|h| (h * 60, (h + 1) * 60)).collect();
    assert!(pack_intervals(&chain).iter().all(|&lane| lane == 0));
}
