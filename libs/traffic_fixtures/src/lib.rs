//! Fixture locator for the test road networks.

use std::path::PathBuf;

/// Two disconnected roads near Lancaster, PA, each carrying a chain of
/// traffic segments in both directions.
pub const TRAFFIC_TILES: &str = "traffic_tiles.json";

/// Matcher configuration used by the scenario tests.
pub const MATCHER_CONFIG: &str = "matcher_config.json";

/// Resolves a fixture's file name into its absolute path.
pub fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join(file)
}
