use sf_project::schema::*;
use sf_project::{ProjectError, ValidationError, from_yaml_str, validate_project};

const BASE: &str = r#"
version: 1
name: Validation
time:
  start: "2018-01-01T00:00:00Z"
  end: "2018-01-01T01:00:00Z"
  runoff_step_s: 60
rainfall:
  type: DesignStorms
  a: 10.0
  n: 0.4
  count: 2
nodes:
  - id: "J1"
    terrain_elevation_m: 11.0
  - id: "Out"
    terrain_elevation_m: 10.0
links:
  - id: "1"
    from_node_id: "J1"
    to_node_id: "Out"
    length_m: 100.0
    roughness: 80.0
subcatchments:
  - id: "S1"
    node_id: "J1"
    area_m2: 5000.0
    slope: 0.01
    width_m: 50.0
    impervious_pct: 50.0
    pervious:
      depression_storage_mm: 2.0
      roughness: 0.1
    impervious:
      depression_storage_mm: 0.5
      roughness: 0.012
"#;

fn base() -> Project {
    from_yaml_str(BASE).unwrap()
}

#[test]
fn base_project_is_valid() {
    let project = base();
    assert_eq!(project.links.len(), 1);
    assert_eq!(project.subcatchments[0].routing, InternalRoutingDef::Outlet);
}

#[test]
fn duplicate_node_is_rejected() {
    let mut project = base();
    project.nodes.push(project.nodes[0].clone());
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { ref id, .. } if id == "J1"));
}

#[test]
fn link_to_unknown_node_is_rejected() {
    let mut project = base();
    project.links[0].to_node_id = "J9".to_string();
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { ref id, .. } if id == "J9"));
}

#[test]
fn subcatchment_on_unknown_node_is_rejected() {
    let mut project = base();
    project.subcatchments[0].node_id = "nowhere".to_string();
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn routing_grid_must_end_within_runoff_grid() {
    let mut project = base();
    // 6030 s horizon: runoff stops at 6000 s, routing reaches 6030 s
    project.time.end = "2018-01-01T01:40:30Z".to_string();
    project.time.runoff_step_s = 60;
    project.time.routing_step_s = Some(90);
    let err = validate_project(&project).unwrap_err();
    assert!(
        matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "time.routing_step_s")
    );

    // Coarser runoff steps that still cover every routing instant are fine
    project.time.end = "2018-01-01T01:00:00Z".to_string();
    project.time.runoff_step_s = 120;
    project.time.routing_step_s = Some(90);
    assert!(validate_project(&project).is_ok());
}

#[test]
fn percentages_are_bounded() {
    let mut project = base();
    project.subcatchments[0].impervious_pct = 120.0;
    assert!(matches!(
        validate_project(&project).unwrap_err(),
        ValidationError::InvalidValue { .. }
    ));

    let mut project = base();
    project.subcatchments[0].routing = InternalRoutingDef::PerviousToImpervious { routed_pct: -5.0 };
    assert!(validate_project(&project).is_err());
}

#[test]
fn time_window_must_be_ordered() {
    let mut project = base();
    project.time.end = project.time.start.clone();
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("time.end"));

    let mut project = base();
    project.time.start = "yesterday".to_string();
    assert!(validate_project(&project).is_err());
}

#[test]
fn custom_catalog_needs_consistent_sizes() {
    let mut project = base();
    project.catalog = CatalogDef::Custom {
        name: "bad".to_string(),
        sizes: vec![PipeSizeDef {
            inner_mm: 300.0,
            outer_mm: 290.0,
        }],
    };
    assert!(validate_project(&project).is_err());

    project.catalog = CatalogDef::Custom {
        name: "empty".to_string(),
        sizes: vec![],
    };
    assert!(validate_project(&project).is_err());
}

#[test]
fn record_with_repeated_sample_is_rejected() {
    let mut project = base();
    let sample = RainSampleDef {
        time: "2018-01-01T00:00:00Z".to_string(),
        intensity_mm_per_hour: 5.0,
    };
    project.rainfall = RainfallDef::Record {
        samples: vec![sample.clone(), sample],
    };
    assert!(matches!(
        validate_project(&project).unwrap_err(),
        ValidationError::DuplicateId { .. }
    ));
}

#[test]
fn zero_storm_count_is_rejected() {
    let mut project = base();
    project.rainfall = RainfallDef::DesignStorms {
        a: 10.0,
        n: 0.4,
        count: 0,
    };
    assert!(validate_project(&project).is_err());
}

#[test]
fn newer_versions_are_refused() {
    let yaml = BASE.replace("version: 1", "version: 7");
    let err = from_yaml_str(&yaml).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::UnsupportedVersion { version: 7 })
    ));
}
