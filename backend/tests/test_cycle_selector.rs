//! Cycle Selector Tests
//!
//! Greedy per-cycle selection: cap, latitude exclusion, pass-through of
//! already rejected requests, override policies and linked-pair
//! conflicts.

use orbit_deconflict_core_rs::{
    select_cycle, CycleId, CycleOutcome, CycleResolution, HalfWidthSchedule, Request,
    SelectionConfig,
};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

const CYCLE: CycleId = CycleId(59659);

fn create_request(id: &str, priority: i64, latitude: f64) -> Request {
    Request::new(id, CYCLE, priority, latitude)
}

fn config_with_cap(per_cycle_cap: usize) -> SelectionConfig {
    SelectionConfig {
        per_cycle_cap,
        ..Default::default()
    }
}

fn resolve(requests: Vec<Request>, config: &SelectionConfig) -> CycleResolution {
    match select_cycle(CYCLE, requests, config).unwrap() {
        CycleOutcome::Resolved(resolution) => resolution,
        CycleOutcome::Conflict(conflict) => panic!("unexpected conflict: {:?}", conflict),
    }
}

fn priority_of(resolution: &CycleResolution, id: &str) -> i64 {
    resolution
        .requests
        .iter()
        .find(|r| r.id() == id)
        .map(Request::priority)
        .unwrap_or_else(|| panic!("request {} missing from output", id))
}

// ============================================================================
// Base Rule
// ============================================================================

#[test]
fn test_shared_priority_cap_one_keeps_equatorial_request() {
    let requests = vec![
        create_request("lat0", 100, 0.0),
        create_request("lat10", 100, 10.0),
        create_request("lat50", 100, 50.0),
        create_request("lat-50", 100, -50.0),
        create_request("lat80", 100, 80.0),
    ];
    let config = SelectionConfig {
        per_cycle_cap: 1,
        half_width_schedule: HalfWidthSchedule::new(vec![(0, 40.0)]).unwrap(),
        ..Default::default()
    };

    let resolution = resolve(requests, &config);

    // ranks: lat80 → 100, lat50 → 101, lat-50 → 102, lat10 → 103, lat0 → 104
    assert_eq!(resolution.accepted_count, 1);
    assert_eq!(priority_of(&resolution, "lat0"), 104);
    assert_eq!(priority_of(&resolution, "lat10"), -103);
    assert_eq!(priority_of(&resolution, "lat-50"), -102);
    assert_eq!(priority_of(&resolution, "lat50"), -101);
    assert_eq!(priority_of(&resolution, "lat80"), -100);
}

#[test]
fn test_output_is_ordered_by_final_priority() {
    let requests = vec![
        create_request("low", 10, -70.0),
        create_request("high", 30, 70.0),
        create_request("mid", 20, 0.0),
        create_request("done", -50, 0.0),
    ];

    let resolution = resolve(requests, &config_with_cap(4));

    let order: Vec<&str> = resolution.requests.iter().map(Request::id).collect();
    assert_eq!(order, vec!["high", "mid", "low", "done"]);
}

#[test]
fn test_exclusion_rejects_even_under_cap() {
    let requests = vec![
        create_request("first", 200, 10.0),
        create_request("near", 150, 45.0),
        create_request("far", 100, 55.0),
    ];

    let resolution = resolve(requests, &config_with_cap(4));

    assert_eq!(priority_of(&resolution, "first"), 200);
    assert_eq!(priority_of(&resolution, "near"), -150);
    // [−30, 50] does not reach 55
    assert_eq!(priority_of(&resolution, "far"), 100);
    assert_eq!(resolution.accepted_count, 2);
}

#[test]
fn test_rejected_requests_do_not_exclude() {
    let requests = vec![
        create_request("a", 300, 0.0),
        create_request("b", 200, 35.0),
        create_request("c", 100, 70.0),
    ];

    let resolution = resolve(requests, &config_with_cap(4));

    // b is inside a's zone; its own zone would have covered c
    assert_eq!(priority_of(&resolution, "b"), -200);
    assert_eq!(priority_of(&resolution, "c"), 100);
}

#[test]
fn test_negative_requests_pass_through_unchanged() {
    let requests = vec![
        create_request("old", -900, 0.0),
        create_request("new", 100, 0.0),
    ];

    let resolution = resolve(requests, &config_with_cap(1));

    assert_eq!(priority_of(&resolution, "old"), -900);
    assert_eq!(priority_of(&resolution, "new"), 100);
}

#[test]
fn test_priority_tier_sets_zone_width() {
    let config = SelectionConfig {
        per_cycle_cap: 4,
        half_width_schedule: HalfWidthSchedule::new(vec![(1000, 40.0), (0, 5.0)]).unwrap(),
        ..Default::default()
    };
    let requests = vec![
        create_request("small", 500, 0.0),
        create_request("neighbour", 400, 6.0),
    ];

    let resolution = resolve(requests, &config);
    assert_eq!(priority_of(&resolution, "neighbour"), 400);
}

#[test]
fn test_selection_events_are_logged() {
    let requests = vec![
        create_request("keep", 200, 0.0),
        create_request("drop", 100, 0.0),
    ];

    let resolution = resolve(requests, &config_with_cap(4));

    assert_eq!(resolution.events.events_of_type("Accepted").len(), 1);
    assert_eq!(resolution.events.events_of_type("Rejected").len(), 1);
    assert_eq!(resolution.events.events_for_request("drop").len(), 1);
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_high_altitude_override_keeps_polar_request() {
    let requests = vec![
        create_request("winner", 200, 60.0),
        create_request("polar", 100, 70.0).with_alternate_count(5),
    ];
    let config = SelectionConfig {
        per_cycle_cap: 1,
        high_altitude_override: Some(1),
        ..Default::default()
    };

    let resolution = resolve(requests, &config);

    assert_eq!(priority_of(&resolution, "winner"), 200);
    assert_eq!(priority_of(&resolution, "polar"), 1);
    assert_eq!(resolution.accepted_count, 1);
    assert_eq!(resolution.overridden_count, 1);
    assert_eq!(resolution.events.events_of_type("HighAltitudeOverride").len(), 1);
}

#[test]
fn test_high_altitude_override_needs_alternates() {
    let requests = vec![
        create_request("winner", 200, 60.0),
        create_request("polar", 100, 70.0).with_alternate_count(3),
    ];
    let config = SelectionConfig {
        per_cycle_cap: 1,
        high_altitude_override: Some(1),
        ..Default::default()
    };

    let resolution = resolve(requests, &config);
    assert_eq!(priority_of(&resolution, "polar"), -100);
}

#[test]
fn test_override_disabled_by_default() {
    let requests = vec![
        create_request("winner", 200, 60.0),
        create_request("polar", 100, 70.0).with_alternate_count(5),
    ];

    let resolution = resolve(requests, &config_with_cap(1));
    assert_eq!(priority_of(&resolution, "polar"), -100);
    assert_eq!(resolution.overridden_count, 0);
}

#[test]
fn test_high_roll_neighbour_enables_one_override() {
    let requests = vec![
        create_request("steep", 200, 10.0).with_roll_angle(25.0),
        create_request("nadir", 100, 12.0).with_roll_angle(1.0),
        create_request("second", 50, 11.0).with_roll_angle(0.0),
    ];
    let config = SelectionConfig {
        per_cycle_cap: 4,
        high_roll_threshold: Some(20.0),
        ..Default::default()
    };

    let resolution = resolve(requests, &config);

    assert_eq!(priority_of(&resolution, "steep"), 200);
    assert_eq!(priority_of(&resolution, "nadir"), 100);
    assert_eq!(priority_of(&resolution, "second"), -50);
    assert_eq!(resolution.events.events_of_type("HighRollOverride").len(), 1);
}

// ============================================================================
// Linked Pairs
// ============================================================================

#[test]
fn test_rejected_linked_request_is_a_conflict() {
    let requests = vec![
        create_request("winner", 200, 0.0),
        create_request("half", 100, 5.0).with_link_tag("stereo1", "other-half"),
    ];

    match select_cycle(CYCLE, requests, &config_with_cap(4)).unwrap() {
        CycleOutcome::Conflict(conflict) => {
            assert_eq!(conflict.cycle, CYCLE);
            assert_eq!(conflict.rejected_id, "half");
            assert_eq!(conflict.pair_id, "stereo1");
            assert_eq!(conflict.partner_id, "other-half");
        }
        CycleOutcome::Resolved(_) => panic!("expected a linked-pair conflict"),
    }
}

#[test]
fn test_accepted_linked_request_is_not_a_conflict() {
    let requests = vec![create_request("half", 100, 5.0).with_link_tag("stereo1", "other-half")];
    let resolution = resolve(requests, &config_with_cap(4));
    assert_eq!(priority_of(&resolution, "half"), 100);
}

// ============================================================================
// Property Tests
// ============================================================================

fn arb_requests() -> impl Strategy<Value = Vec<Request>> {
    prop::collection::vec((1i64..500, -90i32..=90), 0..30).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (priority, lat))| {
                create_request(&format!("r{}", i), priority, f64::from(lat)).with_position(i)
            })
            .collect()
    })
}

/// Requests with pairwise distinct priorities, so no group is left tied
fn arb_distinct_requests() -> impl Strategy<Value = Vec<Request>> {
    (
        prop::collection::btree_set(1i64..500, 0..30),
        prop::collection::vec(-90i32..=90, 30),
    )
        .prop_map(|(priorities, latitudes)| {
            priorities
                .into_iter()
                .zip(latitudes)
                .enumerate()
                .map(|(i, (priority, lat))| {
                    create_request(&format!("r{}", i), priority, f64::from(lat)).with_position(i)
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn cap_and_separation_hold(requests in arb_requests(), cap in 1usize..6) {
        let count = requests.len();
        let resolution = resolve(requests, &config_with_cap(cap));

        prop_assert_eq!(resolution.requests.len(), count);

        let kept: Vec<f64> = resolution
            .requests
            .iter()
            .filter(|r| r.priority() >= 0 && resolution.events.events_for_request(r.id())
                .iter()
                .any(|e| e.event_type() == "Accepted"))
            .map(Request::latitude)
            .collect();
        prop_assert!(kept.len() <= cap);
        prop_assert_eq!(kept.len(), resolution.accepted_count);

        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                prop_assert!((a - b).abs() > 40.0, "{} and {} overlap", a, b);
            }
        }
    }

    #[test]
    fn selecting_a_resolved_cycle_changes_nothing(requests in arb_distinct_requests(), cap in 1usize..6) {
        let config = config_with_cap(cap);
        let first = resolve(requests, &config);
        let second = resolve(first.requests.clone(), &config);

        let before: Vec<(String, i64)> =
            first.requests.iter().map(|r| (r.id().to_string(), r.priority())).collect();
        let after: Vec<(String, i64)> =
            second.requests.iter().map(|r| (r.id().to_string(), r.priority())).collect();
        prop_assert_eq!(before, after);
    }
}
