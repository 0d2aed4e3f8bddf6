//! The matching facade.
//!
//! [`TrafficSegmentMatcher`] runs the whole pipeline over a trace:
//! the HMM [`MapMatcher`], the [interpolator](crate::interpolation), and
//! the [segment former](crate::segment). Each stage's output is an
//! ordinary value, available through [`TrafficSegmentMatcher::map_match`]
//! for callers which need the intermediate path.
//!
//! Requests and responses are JSON documents:
//!
//! ```json
//! { "trace": [{ "lon": -76.376045, "lat": 40.539207, "time": 0 }] }
//! ```


use crate::config::MatcherConfig;
use crate::error::{ConfigError, Error, MatchError};
use crate::graph::{GraphReader, SegmentAssociation};
use crate::index::CandidateIndex;
use crate::interpolation::{interpolate, InterpolationPoint};
use crate::route::GraphRouter;
use crate::segment::{form_segments, TrafficSegmentRecord};
use crate::transition::{MapMatcher, MatchedTrace};
use crate::Measurement;

use geo::Point;
use log::{debug, info};
use measure_time::debug_time;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One observed point of a request's trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub lon: f64,
    pub lat: f64,

    /// Seconds since the start of the trace. Absent or `-1` when unknown.
    #[serde(default)]
    pub time: Option<f64>,

    /// Overrides the configured `gps_accuracy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// Overrides the configured `search_radius`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRequest {
    pub trace: Vec<TracePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResponse {
    pub segments: Vec<TrafficSegmentRecord>,

    /// The matched path as `[lon, lat]` polylines, one per continuous
    /// stretch. Only present when `default.geometry` is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<Vec<[f64; 2]>>>,
}

/// Matches traces onto traffic segments.
///
/// The configuration is fixed at construction. A single matcher may serve
/// many traces concurrently, sharing its graph and Candidate Index cache.
pub struct TrafficSegmentMatcher<G> {
    config: MatcherConfig,
    graph: Arc<G>,
    index: CandidateIndex<G>,
    router: GraphRouter<G>,
}

impl<G> TrafficSegmentMatcher<G>
where
    G: GraphReader + SegmentAssociation,
{
    /// Validates the configuration, and builds a matcher over the graph.
    pub fn new(config: MatcherConfig, graph: Arc<G>) -> Result<Self, ConfigError> {
        config.validate()?;
        info!("Building matcher (mode={}, grid={}m)", config.mode, config.grid.size);

        Ok(Self {
            index: CandidateIndex::new(graph.clone(), &config.grid, config.mode),
            router: GraphRouter::new(graph.clone(), config.mode),
            graph,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    #[inline]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    #[inline]
    pub fn index(&self) -> &CandidateIndex<G> {
        &self.index
    }

    /// Converts the request's points into measurements, applying the
    /// configured accuracy and search radius where a point gives none.
    pub fn measurements(&self, request: &TraceRequest) -> Result<Vec<Measurement>, MatchError> {
        if request.trace.is_empty() {
            return Err(MatchError::EmptyTrace);
        }

        let defaults = &self.config.default;
        request
            .trace
            .iter()
            .enumerate()
            .map(|(index, point)| {
                Measurement::new(
                    Point::new(point.lon, point.lat),
                    point.accuracy.unwrap_or(defaults.gps_accuracy),
                    point.radius.unwrap_or(defaults.search_radius),
                    point.time,
                )
                .map_err(|source| MatchError::InvalidMeasurement { index, source })
            })
            .collect()
    }

    /// Matches the measurements onto the network.
    pub fn map_match(&self, measurements: &[Measurement]) -> Result<MatchedTrace, MatchError> {
        debug_time!("map matching {} measurements", measurements.len());
        MapMatcher::new(&self.index, &self.router, &self.config.default).match_measurements(measurements)
    }

    fn pipeline(
        &self,
        measurements: &[Measurement],
    ) -> Result<(Vec<Vec<InterpolationPoint>>, Vec<TrafficSegmentRecord>), Error> {
        let matched = self.map_match(measurements)?;

        let groups = {
            debug_time!("interpolating");
            interpolate(&matched)
        };

        let records = {
            debug_time!("forming segments");
            form_segments(&groups, self.graph.as_ref())?
        };

        info!(
            "Trace of {} points produced {} records over {} groups",
            measurements.len(),
            records.len(),
            groups.len()
        );

        Ok((groups, records))
    }

    /// Matches the measurements onto traffic segments.
    pub fn match_measurements(&self, measurements: &[Measurement]) -> Result<Vec<TrafficSegmentRecord>, Error> {
        self.pipeline(measurements).map(|(_, records)| records)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn match_trace(&self, request: &TraceRequest) -> Result<TraceResponse, Error> {
        let measurements = self.measurements(request)?;
        let (groups, segments) = self.pipeline(&measurements)?;

        let shape = self
            .config
            .default
            .geometry
            .then(|| groups.iter().map(|group| self.polyline(group)).collect());

        Ok(TraceResponse { segments, shape })
    }

    /// Parses a request document, and writes the response document.
    pub fn match_json(&self, request: &str) -> Result<String, Error> {
        let request: TraceRequest = serde_json::from_str(request)?;
        debug!("Parsed request of {} points", request.trace.len());

        let response = self.match_trace(&request)?;
        Ok(serde_json::to_string(&response)?)
    }

    fn polyline(&self, group: &[InterpolationPoint]) -> Vec<[f64; 2]> {
        let mut line: Vec<[f64; 2]> = Vec::new();

        for point in group {
            let Some(edge) = self.graph.edge(point.edge) else {
                continue;
            };

            for position in edge.shape().slice(point.begin_fraction, point.end_fraction) {
                let coordinate = [position.x(), position.y()];
                if line.last() != Some(&coordinate) {
                    line.push(coordinate);
                }
            }
        }

        line
    }
}
