use af_project::*;

fn base_case() -> CaseDef {
    CaseDef {
        version: 1,
        name: "Validation".to_string(),
        flow: FlowDef::default(),
        inlet: InletDef { id: 1.into() },
        outlets: vec![
            OutletDef {
                id: 2.into(),
                area_ratio: 0.7,
                area_mm2: Some(3.0),
            },
            OutletDef {
                id: 3.into(),
                area_ratio: 0.3,
                area_mm2: Some(1.5),
            },
        ],
        control: ControlDef::default(),
        synthetic: None,
    }
}

#[test]
fn base_case_is_valid() {
    validate_case(&base_case()).unwrap();
}

#[test]
fn ratio_sum_outside_tolerance() {
    let mut case = base_case();
    case.outlets[1].area_ratio = 0.25;
    let err = validate_case(&case).unwrap_err();
    assert!(matches!(err, ValidationError::RatioSum { .. }));

    case.control.ratio_sum_tolerance = 0.1;
    validate_case(&case).unwrap();
}

#[test]
fn zero_area_ratio_rejected() {
    let mut case = base_case();
    case.outlets[0].area_ratio = 0.0;
    let err = validate_case(&case).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn outlet_reusing_inlet_tag_rejected() {
    let mut case = base_case();
    case.outlets[1].id = 1.into();
    let err = validate_case(&case).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { .. }));
}

#[test]
fn partial_areas_rejected() {
    let mut case = base_case();
    case.outlets[1].area_mm2 = None;
    assert!(validate_case(&case).is_err());
}

#[test]
fn zero_sample_interval_rejected() {
    let mut case = base_case();
    case.control.sample_interval = 0;
    let err = validate_case(&case).unwrap_err();
    assert!(err.to_string().contains("sample_interval"));
}

#[test]
fn unsupported_version_rejected() {
    let mut case = base_case();
    case.version = LATEST_VERSION + 1;
    assert!(matches!(
        validate_case(&case).unwrap_err(),
        ValidationError::UnsupportedVersion { .. }
    ));
}

#[test]
fn synthetic_network_must_cover_every_outlet() {
    let mut case = base_case();
    case.synthetic = Some(SyntheticNetworkDef {
        mean_flow: 1.0,
        amplitude: 0.0,
        resistances: vec![ResistanceDef {
            id: 2.into(),
            resistance: 1.0,
        }],
    });
    assert!(matches!(
        validate_case(&case).unwrap_err(),
        ValidationError::MissingReference { .. }
    ));
}

#[test]
fn synthetic_resistance_for_unknown_outlet() {
    let mut case = base_case();
    case.synthetic = Some(SyntheticNetworkDef {
        mean_flow: 1.0,
        amplitude: 0.0,
        resistances: vec![
            ResistanceDef {
                id: 2.into(),
                resistance: 1.0,
            },
            ResistanceDef {
                id: 3.into(),
                resistance: 1.0,
            },
            ResistanceDef {
                id: 9.into(),
                resistance: 1.0,
            },
        ],
    });
    assert!(validate_case(&case).is_err());
}
