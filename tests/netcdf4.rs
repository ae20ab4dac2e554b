//! Integration test: write a small NetCDF-4 granule and build its graph.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use varinfo::{GraphConfig, VariableGraph};

fn write_granule(path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_attribute("short_name", "M2I3NPASM")?;
    file.add_dimension("time", 2)?;
    file.add_dimension("lat", 3)?;
    file.add_dimension("lon", 4)?;

    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "minutes since 2000-01-01 00:00:00")?;
    }
    {
        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
    }
    {
        let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
        lon.put_attribute("units", "degrees_east")?;
    }
    {
        let mut temperature = file.add_variable::<f32>("T", &["time", "lat", "lon"])?;
        temperature.put_attribute("long_name", "air temperature")?;
        temperature.put_attribute("valid_range", vec![150.0f32, 350.0])?;
    }

    let mut group = file.add_group("ancillary")?;
    group.add_dimension("band", 5)?;
    let mut quality = group.add_variable::<i32>("quality", &["band"])?;
    quality.put_attribute("coordinates", "/lat /lon")?;

    Ok(())
}

fn paths(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn build_graph(config: GraphConfig) -> VariableGraph {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("granule.nc4");
    write_granule(&path).unwrap();

    VariableGraph::from_file(&path, &config).unwrap()
}

#[test]
fn reads_groups_variables_and_dimensions() {
    let graph = build_graph(GraphConfig::new());

    assert_eq!(
        graph.get_all_variables(),
        paths(&["/time", "/lat", "/lon", "/T", "/ancillary/quality"])
    );
    assert_eq!(graph.get_dimension_size("/ancillary/band"), Some(5));
    assert_eq!(
        graph.get_group("/ancillary").unwrap().variables(),
        &paths(&["/ancillary/quality"])
    );

    let temperature = graph.get_variable("/T").unwrap();
    assert_eq!(temperature.data_type(), "float32");
    assert_eq!(temperature.shape(), Some(&[2, 3, 4][..]));
    assert_eq!(temperature.dimensions(), ["/time", "/lat", "/lon"]);
    assert_eq!(temperature.get_valid_min(), Some(150.0));
    assert_eq!(temperature.get_valid_max(), Some(350.0));
}

#[test]
fn classifies_netcdf_variables() {
    let graph = build_graph(GraphConfig::new());

    assert_eq!(
        graph.get_science_variables(),
        paths(&["/T", "/ancillary/quality"])
    );
    assert!(graph.get_metadata_variables().is_empty());
    assert_eq!(
        graph.get_spatial_dimensions(&paths(&["/T"])),
        paths(&["/lat", "/lon"])
    );
    assert_eq!(
        graph.get_temporal_dimensions(&paths(&["/T"])),
        paths(&["/time"])
    );
    assert_eq!(
        graph.get_required_variables(&paths(&["/ancillary/quality"])),
        paths(&["/ancillary/quality", "/lat", "/lon"])
    );
}

#[test]
fn discovers_short_name_from_global_attribute() {
    let mut rules = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        rules,
        r#"{{"Mission": {{"M2": "MERRA-2"}}, "CollectionShortNamePath": ["/short_name"]}}"#
    )
    .unwrap();

    let graph = build_graph(GraphConfig::new().with_config_file(rules.path()));

    assert_eq!(graph.short_name(), Some("M2I3NPASM"));
    assert_eq!(graph.mission(), Some("MERRA-2"));
}
