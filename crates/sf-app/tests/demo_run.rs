use std::path::{Path, PathBuf};

use sf_app::{
    RunReport, SeriesKind, compile_project, export_series_csv, find_link, load_project,
    run_project, save_report_json,
};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/projects")
        .join(name)
}

fn downstream_water_depth(report: &RunReport, id: &str) -> f64 {
    let link = find_link(report, id).unwrap();
    link.water_depth_m + link.downstream_offset_m
}

#[test]
fn urban_network_runs_end_to_end() {
    let project = load_project(&demo("urban_network.yaml")).unwrap();
    let report = run_project(&project).unwrap();

    assert_eq!(report.scenarios, vec![1, 2, 3]);
    assert_eq!(report.links.len(), 10);
    // Upstream-first order ends with the trunk to the outfall
    assert_eq!(report.links.last().unwrap().id, "20");

    let pvc = [153.6, 192.2, 240.2, 302.6, 384.2, 480.4, 605.4];
    for link in &report.links {
        assert!(link.peak_discharge_m3_per_s > 0.0, "link {}", link.id);
        assert!(
            pvc.iter().any(|d| (d - link.inner_diameter_mm).abs() < 1e-9),
            "link {} has {} mm",
            link.id,
            link.inner_diameter_mm
        );
        assert!(link.upstream_offset_m >= 0.0 && link.downstream_offset_m >= 0.0);
        assert!(link.upstream_invert_elevation_m > link.downstream_invert_elevation_m);
    }

    let trunk = find_link(&report, "20").unwrap();
    for head in ["18", "19"] {
        assert!(trunk.inner_diameter_mm >= find_link(&report, head).unwrap().inner_diameter_mm);
    }
}

#[test]
fn water_surfaces_are_aligned_at_junctions() {
    let project = load_project(&demo("urban_network.yaml")).unwrap();
    let report = run_project(&project).unwrap();

    for (incoming, outgoing) in [
        (["11", "12"].as_slice(), "13"),
        (["14", "15"].as_slice(), "16"),
        (["13", "16"].as_slice(), "17"),
        (["17", "18", "19"].as_slice(), "20"),
    ] {
        let expected = downstream_water_depth(&report, outgoing);
        for id in incoming {
            let depth = downstream_water_depth(&report, id);
            assert!(
                (depth - expected).abs() < 1e-9,
                "link {id}: {depth} vs {outgoing}: {expected}"
            );
        }
    }
}

#[test]
fn outfall_series_exports_as_csv() {
    let project = load_project(&demo("urban_network.yaml")).unwrap();
    let report = run_project(&project).unwrap();

    let csv = export_series_csv(&report, SeriesKind::NodeInflow, "J11", 2).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("time,value"));
    // Two hours at 30 s, both ends included
    assert_eq!(lines.count(), 241);

    assert!(export_series_csv(&report, SeriesKind::LinkOutflow, "99", 1).is_err());
}

#[test]
fn report_survives_json() {
    let project = load_project(&demo("single_link_record.yaml")).unwrap();
    let report = run_project(&project).unwrap();

    let path = std::env::temp_dir().join("sf_app_single_link_report.json");
    save_report_json(&path, &report).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let loaded: RunReport = serde_json::from_str(&content).unwrap();

    assert_eq!(loaded.project, report.project);
    assert_eq!(loaded.links.len(), 1);
    assert_eq!(loaded.scenarios, vec![1]);
    assert!([300.0, 400.0, 500.0, 600.0].contains(&loaded.links[0].inner_diameter_mm));
}

#[test]
fn measured_record_is_interpolated_onto_runoff_grid() {
    let project = load_project(&demo("single_link_record.yaml")).unwrap();
    let compiled = compile_project(&project).unwrap();

    let rain = compiled.rainfall.series(sf_core::ScenarioId(1)).unwrap();
    let t = compiled.options.runoff_grid.at(7);
    let expected = sf_core::units::mm_per_hour(19.2).value;
    let got = rain.get(t).unwrap();
    assert!((got - expected).abs() <= 1e-12 * expected);

    // Past the last sample the record counts as dry
    assert_eq!(rain.get(compiled.options.runoff_grid.last()), Some(0.0));
}
