//! Request Model Tests
//!
//! Parsing records into requests with configurable column names.

use orbit_deconflict_core_rs::{parse_requests, CycleId, FieldNames, Record, Request, RequestError};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn full_record() -> Record {
    record(&[
        ("Team Database ID", "164320"),
        ("Orbit Number", "59725b"),
        ("Request Priority", "11000"),
        ("Latitude", "-72.5"),
        ("Roll Angle", "-12.25"),
        ("Orbit Alternatives", "59700 59712 59738 59751"),
        ("Coordinated Track History", "stereo7:169940 second half"),
        ("Target Name", "South Polar Layered Deposits"),
    ])
}

#[test]
fn test_full_record_parses_every_field() {
    let request = Request::from_record(full_record(), &FieldNames::default(), 3).unwrap();

    assert_eq!(request.id(), "164320");
    assert_eq!(request.cycle(), CycleId(59725));
    assert_eq!(request.priority(), 11000);
    assert_eq!(request.latitude(), -72.5);
    assert_eq!(request.roll_angle(), -12.25);
    assert_eq!(request.alternate_count(), 4);
    assert_eq!(request.position(), 3);

    let tag = request.link_tag().unwrap();
    assert_eq!(tag.pair_id, "stereo7");
    assert_eq!(tag.partner_id, "169940");
}

#[test]
fn test_optional_fields_default_when_absent_or_blank() {
    let minimal = record(&[
        ("Team Database ID", "1"),
        ("Orbit Number", "10"),
        ("Request Priority", "5"),
        ("Latitude", "0"),
        ("Roll Angle", "  "),
        ("Coordinated Track History", "C"),
    ]);

    let request = Request::from_record(minimal, &FieldNames::default(), 0).unwrap();

    assert_eq!(request.roll_angle(), 0.0);
    assert_eq!(request.alternate_count(), 0);
    assert!(request.link_tag().is_none());
}

#[test]
fn test_missing_required_field_names_position() {
    let mut incomplete = full_record();
    incomplete.remove("Latitude");

    let err = Request::from_record(incomplete, &FieldNames::default(), 7).unwrap_err();
    assert_eq!(
        err,
        RequestError::MissingField {
            position: 7,
            field: "Latitude".to_string()
        }
    );
}

#[test]
fn test_bad_values_are_reported() {
    let mut bad_priority = full_record();
    bad_priority.insert("Request Priority".to_string(), "11000.5".to_string());
    assert!(matches!(
        Request::from_record(bad_priority, &FieldNames::default(), 0),
        Err(RequestError::InvalidInteger { .. })
    ));

    let mut huge_priority = full_record();
    huge_priority.insert("Request Priority".to_string(), "1e30".to_string());
    assert_eq!(
        Request::from_record(huge_priority, &FieldNames::default(), 2).unwrap_err(),
        RequestError::InvalidInteger {
            position: 2,
            field: "Request Priority".to_string(),
            value: "1e30".to_string()
        }
    );

    let mut bad_latitude = full_record();
    bad_latitude.insert("Latitude".to_string(), "north".to_string());
    assert!(matches!(
        Request::from_record(bad_latitude, &FieldNames::default(), 0),
        Err(RequestError::InvalidNumber { .. })
    ));

    let mut bad_cycle = full_record();
    bad_cycle.insert("Orbit Number".to_string(), "orbit".to_string());
    assert_eq!(
        Request::from_record(bad_cycle, &FieldNames::default(), 0).unwrap_err(),
        RequestError::InvalidCycle("orbit".to_string())
    );
}

#[test]
fn test_custom_field_names() {
    let fields = FieldNames {
        id: "id".to_string(),
        cycle: "cycle".to_string(),
        priority: "priority".to_string(),
        latitude: "lat".to_string(),
        ..Default::default()
    };
    let records = vec![
        record(&[("id", "a"), ("cycle", "1"), ("priority", "10"), ("lat", "1.5")]),
        record(&[("id", "b"), ("cycle", "2"), ("priority", "-3"), ("lat", "2.5")]),
    ];

    let requests = parse_requests(records, &fields).unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].position(), 1);
    assert!(requests[1].is_rejected());

    let out = requests[0].clone().into_record(&fields);
    assert_eq!(out["priority"], "10");
}

#[test]
fn test_into_record_keeps_untouched_columns() {
    let mut request = Request::from_record(full_record(), &FieldNames::default(), 0).unwrap();
    request.set_priority(-11000);

    let out = request.into_record(&FieldNames::default());

    let mut expected = full_record();
    expected.insert("Request Priority".to_string(), "-11000".to_string());
    assert_eq!(out, expected);
}
