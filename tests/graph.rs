//! Integration test: build a variable graph from a DMR file and a YAML rule
//! document, then query it the way a subsetter would.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use varinfo::data::AttributeValue;
use varinfo::{GraphConfig, VarInfoError, VariableGraph};

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn paths(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn atl03_graph() -> VariableGraph {
    let config = GraphConfig::new().with_config_file(data_path("rules.yml"));
    VariableGraph::from_file(&data_path("ATL03_example.dmr"), &config).unwrap()
}

#[test]
fn identifies_collection_from_granule_metadata() {
    let graph = atl03_graph();

    assert_eq!(graph.short_name(), Some("ATL03"));
    assert_eq!(graph.mission(), Some("ICESat2"));
    assert_eq!(graph.get_all_variables().len(), 11);
}

#[test]
fn overrides_fill_gaps_by_specificity() {
    let graph = atl03_graph();

    let h_ph = graph.get_variable("/gt1r/heights/h_ph").unwrap();
    assert_eq!(
        h_ph.get_attribute_value("conflicting_attribute"),
        Some(&AttributeValue::from("h_ph variable"))
    );
    assert_eq!(
        h_ph.get_attribute_value("units"),
        Some(&AttributeValue::from("m"))
    );
    assert_eq!(
        h_ph.get_attribute_value("collection_override"),
        Some(&AttributeValue::from("ICESat2 collection"))
    );

    // Native values win over overrides.
    let delta_time = graph.get_variable("/gt1r/heights/delta_time").unwrap();
    assert_eq!(
        delta_time.get_attribute_value("units"),
        Some(&AttributeValue::from("seconds since 2018-01-01"))
    );
    assert!(delta_time.is_temporal());

    let heights = graph.get_group("/gt1r/heights").unwrap();
    assert!(heights.get_attribute_value("units").is_none());
    assert!(heights.get_attribute_value("collection_override").is_some());
}

#[test]
fn qualifies_every_reference_style() {
    let graph = atl03_graph();

    let h_ph = graph.get_variable("/gt1r/heights/h_ph").unwrap();
    assert_eq!(
        h_ph.references_for("coordinates"),
        Some(&paths(&[
            "/gt1r/heights/delta_time",
            "/gt1r/heights/lat_ph",
            "/gt1r/heights/lon_ph",
        ]))
    );
    assert_eq!(
        h_ph.references_for("ancillary_variables"),
        Some(&paths(&["/gt1r/geolocation/delta_time"]))
    );
    assert_eq!(h_ph.references_for("grid_mapping"), Some(&paths(&["/crs"])));

    let signal_conf = graph.get_variable("/gt1r/heights/signal_conf_ph").unwrap();
    assert_eq!(
        signal_conf.references_for("coordinates"),
        h_ph.references_for("coordinates")
    );
    assert_eq!(signal_conf.dimensions(), ["/gt1r/delta_time"]);
    assert_eq!(signal_conf.shape(), Some(&[4][..]));
    assert_eq!(signal_conf.data_type(), "int8");
    assert_eq!(signal_conf.get_range(), Some([-2.0, 4.0]));
}

#[test]
fn classifies_science_and_metadata_variables() {
    let graph = atl03_graph();

    assert_eq!(
        graph.get_science_variables(),
        paths(&["/gt1r/heights/h_ph", "/gt1r/heights/signal_conf_ph"])
    );
    assert_eq!(
        graph.get_metadata_variables(),
        paths(&[
            "/ds_surf_type",
            "/orbit_info/sc_orient",
            "/gt1r/geolocation/reference_photon_lat",
            "/gt1r/geolocation/reference_photon_lon",
        ])
    );
    assert!(graph.variable_is_excluded("/orbit_info/sc_orient"));
}

#[test]
fn required_variables_follow_references_and_rules() {
    let graph = atl03_graph();

    let required = graph.get_required_variables(&paths(&["/gt1r/heights/h_ph"]));

    assert_eq!(
        required,
        paths(&[
            "/gt1r/heights/h_ph",
            "/gt1r/heights/delta_time",
            "/gt1r/heights/lat_ph",
            "/gt1r/heights/lon_ph",
            "/gt1r/geolocation/delta_time",
            "/ds_surf_type",
        ])
    );
    assert!(graph
        .get_required_dimensions(&paths(&["/gt1r/heights/h_ph"]))
        .is_empty());
}

#[test]
fn configured_attributes_for_absent_variables() {
    let graph = atl03_graph();

    assert!(graph.get_variable("/crs").is_none());
    let crs = graph.get_missing_variable_attributes("/crs");
    assert_eq!(
        crs.get("grid_mapping_name"),
        Some(&AttributeValue::from("polar_stereographic"))
    );
    assert_eq!(
        graph.get_references_for_attribute(&["/gt1r/heights/h_ph"], "grid_mapping"),
        paths(&["/crs"])
    );
}

#[test]
fn explicit_short_name_skips_discovery() {
    let config = GraphConfig::new()
        .with_short_name("ATL08")
        .with_config_file(data_path("rules.yml"));
    let graph = VariableGraph::from_file(&data_path("ATL03_example.dmr"), &config).unwrap();

    assert_eq!(graph.short_name(), Some("ATL08"));
    assert_eq!(graph.mission(), Some("ICESat2"));

    // The ATL03-only required variable no longer applies.
    let required = graph.get_required_variables(&paths(&["/gt1r/geolocation/delta_time"]));
    assert_eq!(required, paths(&["/gt1r/geolocation/delta_time"]));
}

#[test]
fn without_rules_nothing_is_overridden() {
    let graph =
        VariableGraph::from_file(&data_path("ATL03_example.dmr"), &GraphConfig::new()).unwrap();

    assert_eq!(graph.short_name(), None);
    assert_eq!(graph.mission(), None);
    let h_ph = graph.get_variable("/gt1r/heights/h_ph").unwrap();
    assert!(h_ph.get_attribute_value("units").is_none());
    assert!(graph.get_science_variables().contains("/orbit_info/sc_orient"));
}

#[test]
fn rejects_rule_file_with_unknown_extension() {
    let config = GraphConfig::new().with_config_file(data_path("ATL03_example.dmr"));
    let error = VariableGraph::from_file(&data_path("ATL03_example.dmr"), &config).unwrap_err();

    assert!(matches!(error, VarInfoError::ConfigFileInvalidFormat { .. }));
    assert!(error.is_config_error());
}

#[test]
fn rejects_document_without_dataset_root() {
    let error =
        VariableGraph::from_dmr_str("<Group name=\"x\"/>", &GraphConfig::new()).unwrap_err();
    assert!(matches!(error, VarInfoError::DmrNamespace { .. }));
}
