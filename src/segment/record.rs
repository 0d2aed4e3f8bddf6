use crate::graph::SegmentId;

use serde::{Deserialize, Serialize};

/// Time and length attributed to one traffic segment by a trace.
///
/// A bound is `None` when the segment's true boundary lies outside
/// the observed trace. The length is only known for a full record,
/// one whose both bounds are known. Absent values are written as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficSegmentRecord {
    pub segment_id: SegmentId,

    #[serde(with = "sentinel")]
    pub start_time: Option<f64>,
    pub begin_shape_index: usize,

    #[serde(with = "sentinel")]
    pub end_time: Option<f64>,
    pub end_shape_index: usize,

    #[serde(with = "sentinel")]
    pub length: Option<f64>,
}

impl TrafficSegmentRecord {
    /// Whether both bounds of the segment were observed.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.length.is_some()
    }
}

/// Maps `None` to and from `-1`.
mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Ok((value >= 0.0).then_some(value))
    }
}
