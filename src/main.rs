use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};
use traffic_matcher::{Error, MatcherConfig, MemoryGraph, TrafficSegmentMatcher};

const USAGE: &str = "usage: traffic_match <config.json> <graph.json> [request.json]";

fn run(config: PathBuf, graph: PathBuf, request: Option<PathBuf>) -> Result<String, Error> {
    let config = MatcherConfig::from_path(config)?;
    let graph = MemoryGraph::from_path(graph)?;
    info!("Loaded {} edges", graph.edge_count());

    let request = match request {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let matcher = TrafficSegmentMatcher::new(config, Arc::new(graph))?;
    matcher.match_json(&request)
}

fn main() {
    env_logger::init();

    #[cfg(feature = "tracing")]
    traffic_matcher::util::trace::initialize_tracer();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let (Some(config), Some(graph)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    match run(config, graph, args.next()) {
        Ok(response) => println!("{response}"),
        Err(e) => {
            error!("{e}");
            eprintln!("traffic_match: {e}");
            std::process::exit(1);
        }
    }
}
