//! Orbit Count Report Tests

use orbit_deconflict_core_rs::{find_empty_orbits, format_report, orbit_count, CycleId, OrbitTally, Request};

fn sample_requests() -> Vec<Request> {
    vec![
        Request::new("a", CycleId(100), 500, 0.0),
        Request::new("b", CycleId(100), 400, 50.0),
        Request::new("c", CycleId(100), -300, 10.0),
        Request::new("d", CycleId(102), -200, 0.0),
        Request::new("e", CycleId(102), 0, 0.0),
        Request::new("f", CycleId(102), -100, 0.0),
    ]
}

#[test]
fn test_orbit_count_tallies_by_sign() {
    let tallies = orbit_count(&sample_requests());

    assert_eq!(
        tallies,
        vec![
            OrbitTally {
                orbit: CycleId(100),
                positive: 2,
                negative: 1
            },
            // zero counts as negative
            OrbitTally {
                orbit: CycleId(102),
                positive: 0,
                negative: 3
            },
        ]
    );
}

#[test]
fn test_empty_orbits_between_first_and_last() {
    let tallies = orbit_count(&sample_requests());
    assert_eq!(find_empty_orbits(&tallies), vec![CycleId(101)]);
    assert!(find_empty_orbits(&[]).is_empty());
}

#[test]
fn test_report_layout() {
    let lines = format_report(&orbit_count(&sample_requests()));
    let trimmed: Vec<&str> = lines.iter().map(|l| l.trim_end()).collect();

    assert_eq!(
        trimmed,
        vec![
            "Orbit (2) # obs # negative obs",
            "--------- ----- --------------",
            "100         2   1",
            "102             3",
            "-Counts-- ----- --------------",
            "    6    =  2  + 4",
            "",
            "# of Observations:  2   0",
            "# of Orbits      :  1   1",
            "",
            "Empty Orbits",
            "------------",
            "101",
        ]
    );
}
