//! Special-Target Priority Tests

use orbit_deconflict_core_rs::special::{
    apply_special_priorities, parse_special_priorities, SpecialPriorityError, DEFAULT_BASE_PRIORITY,
};
use orbit_deconflict_core_rs::{CycleId, Request};
use std::collections::BTreeMap;

fn specials(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries.iter().map(|(id, p)| (id.to_string(), *p)).collect()
}

#[test]
fn test_parse_skips_blank_lines_and_extra_fields() {
    let text = "164320, 6, Oxia Planum, ESP_012345\n\n   \n118256,10\n164320,2\n";
    let parsed = parse_special_priorities(text).unwrap();

    // later lines win
    assert_eq!(parsed, specials(&[("118256", 10), ("164320", 2)]));
}

#[test]
fn test_parse_reports_malformed_line_number() {
    let err = parse_special_priorities("1,5\n2\n").unwrap_err();
    assert_eq!(
        err,
        SpecialPriorityError::MalformedLine {
            line: 2,
            text: "2".to_string()
        }
    );

    assert!(parse_special_priorities("3,high").is_err());
}

#[test]
fn test_boost_only_at_base_priority() {
    let requests = vec![
        Request::new("top", CycleId(1), DEFAULT_BASE_PRIORITY, 0.0),
        Request::new("low", CycleId(1), DEFAULT_BASE_PRIORITY, 0.0),
        Request::new("elsewhere", CycleId(1), 9000, 0.0),
        Request::new("plain", CycleId(1), DEFAULT_BASE_PRIORITY, 0.0),
    ];
    let table = specials(&[("top", 10), ("low", 2), ("elsewhere", 5)]);

    let updated = apply_special_priorities(requests, DEFAULT_BASE_PRIORITY, &table).unwrap();
    let priorities: Vec<i64> = updated.iter().map(Request::priority).collect();

    assert_eq!(priorities, vec![11400, 11320, 9000, 11000]);
}

#[test]
fn test_out_of_range_special_priority_is_an_error() {
    let requests = vec![Request::new("bad", CycleId(1), 500, 0.0)];
    let table = specials(&[("bad", 11)]);

    assert_eq!(
        apply_special_priorities(requests, 500, &table).unwrap_err(),
        SpecialPriorityError::OutOfRange {
            id: "bad".to_string(),
            priority: 11
        }
    );
}

#[test]
fn test_quoted_fields_may_contain_commas() {
    let text = "\"164320\",\"6\",\"Oxia Planum, west rim\"\n118256,10\n";
    let parsed = parse_special_priorities(text).unwrap();

    assert_eq!(parsed, specials(&[("118256", 10), ("164320", 6)]));
}
