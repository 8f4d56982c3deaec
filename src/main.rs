use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use osmnet::osm::WayFilter;
use osmnet::{Network, Options, Planner, Source};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct NetworkLoadError(PathBuf, #[source] osmnet::osm::Error);

/// Builds a routable network from an OSM XML file and prints it as GeoJSON.
#[derive(Parser)]
struct Cli {
    /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
    osm_file: PathBuf,

    /// Tag key used to select ways
    #[arg(long, default_value = "highway")]
    key: String,

    /// Accepted values of the selecting tag; may be repeated
    #[arg(long = "value", default_values_t = vec!["footway".to_string()])]
    values: Vec<String>,

    /// Maximum distance between consecutive nodes, in meters (0 disables interpolation)
    #[arg(long, default_value_t = 0.0)]
    interpolation: f64,

    /// Latitude and longitude of a point to snap to the nearest node
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    nearest: Option<Vec<f64>>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let mut planner = Planner::new(Options {
        source: Source::Path(cli.osm_file.clone()),
        filter: WayFilter::new(cli.key, cli.values),
        interpolation_max_distance: cli.interpolation,
        ..Default::default()
    });

    let network = planner
        .load()
        .map_err(|e| NetworkLoadError(cli.osm_file.clone(), e))?;

    if let Some(&[lat, lon]) = cli.nearest.as_deref() {
        let id = network.nearest_node(lat, lon)?;
        let node = network.node_by_id(id)?;
        eprintln!("nearest node: {} ({}, {})", id, node.lat, node.lon);
    }

    print_geojson(network);
    Ok(())
}

fn print_geojson(network: &Network) {
    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");

    let mut edges = network.edges().peekable();
    while let Some((from, to, length)) = edges.next() {
        let suffix = if edges.peek().is_some() { "," } else { "" };
        // Ids come from the network, so lookups can't fail
        let (Ok(a), Ok(b)) = (network.node_by_id(from), network.node_by_id(to)) else {
            continue;
        };

        println!("    {{");
        println!("      \"type\": \"Feature\",");
        println!(
            "      \"properties\": {{\"from\": \"{}\", \"to\": \"{}\", \"length\": {:.3}}},",
            from, to, length
        );
        println!("      \"geometry\": {{");
        println!("        \"type\": \"LineString\",");
        println!(
            "        \"coordinates\": [[{}, {}], [{}, {}]]",
            a.lon, a.lat, b.lon, b.lat
        );
        println!("      }}");
        println!("    }}{}", suffix);
    }

    println!("  ]");
    println!("}}");
}
