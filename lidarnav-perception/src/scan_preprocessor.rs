use nalgebra::Vector3;
use navci::{Error, IndexMap, RawScan};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ScanPreprocessorConfig {
    /// Lower bound (in meters, sensor frame) of the kept horizontal slice.
    #[serde(default = "default_z_min")]
    pub z_min: f64,
    /// Upper bound (in meters, sensor frame) of the kept horizontal slice.
    #[serde(default = "default_z_max")]
    pub z_max: f64,
    /// Number of slice points considered before decimation.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    /// Number of beams of a preprocessed scan.
    #[serde(default = "default_num_beams")]
    pub num_beams: usize,
}

impl Default for ScanPreprocessorConfig {
    fn default() -> Self {
        Self {
            z_min: default_z_min(),
            z_max: default_z_max(),
            candidate_limit: default_candidate_limit(),
            num_beams: default_num_beams(),
        }
    }
}

fn default_z_min() -> f64 {
    -0.02
}

fn default_z_max() -> f64 {
    0.02
}

fn default_candidate_limit() -> usize {
    970
}

fn default_num_beams() -> usize {
    720
}

/// A preprocessed scan: either empty or exactly `num_beams` long.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan {
    pub points: Vec<Vector3<f64>>,
    pub ranges: Vec<f64>,
}

impl Scan {
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Extracts a single scan plane from a 3-D sensor reading and decimates it
/// to a fixed number of beams.
#[derive(Debug, Clone)]
pub struct RangeScanPreprocessor {
    config: ScanPreprocessorConfig,
}

impl RangeScanPreprocessor {
    pub fn new(config: ScanPreprocessorConfig) -> Result<Self, Error> {
        if config.num_beams == 0 {
            return Err(Error::InvalidConfig {
                name: "num_beams",
                message: "must be positive".to_owned(),
            });
        }
        if config.candidate_limit == 0 {
            return Err(Error::InvalidConfig {
                name: "candidate_limit",
                message: "must be positive".to_owned(),
            });
        }
        if config.z_max < config.z_min {
            return Err(Error::InvalidConfig {
                name: "z_max",
                message: format!("{} is smaller than z_min {}", config.z_max, config.z_min),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanPreprocessorConfig {
        &self.config
    }

    /// Returns an empty scan when the reading holds no usable point.
    pub fn process(&self, raw: &RawScan) -> Scan {
        if raw.points.len() != raw.ranges.len() {
            warn!(
                points = raw.points.len(),
                ranges = raw.ranges.len(),
                "points and ranges of a reading disagree, dropping it"
            );
            return Scan::default();
        }

        let (points, ranges): (Vec<_>, Vec<_>) = raw
            .points
            .iter()
            .zip(&raw.ranges)
            .filter(|(p, _)| self.config.z_min <= p.z && p.z <= self.config.z_max)
            .take(self.config.candidate_limit)
            .map(|(p, r)| (*p, *r))
            .unzip();

        if points.is_empty() {
            debug!(raw = raw.len(), "no point in the scan plane");
            return Scan::default();
        }

        let indices = decimation_indices(points.len(), self.config.num_beams);
        Scan {
            points: indices.clone().map(|i| points[i]).collect(),
            ranges: indices.map(|i| ranges[i]).collect(),
        }
    }

    /// Preprocesses every reading, keeping the order of `readings`.
    pub fn process_batch(&self, readings: &IndexMap<String, RawScan>) -> Vec<Scan> {
        readings.values().map(|raw| self.process(raw)).collect()
    }
}

/// `num_samples` evenly spaced indices over `0..len`, truncated toward zero.
///
/// The first index is always 0 and the last is `len - 1`. Indices repeat
/// when `len < num_samples`.
///
/// # Example
///
/// ```
/// use lidarnav_perception::decimation_indices;
///
/// let indices: Vec<_> = decimation_indices(5, 3).collect();
/// assert_eq!(indices, vec![0, 2, 4]);
/// ```
pub fn decimation_indices(len: usize, num_samples: usize) -> impl Iterator<Item = usize> + Clone {
    let last = len.saturating_sub(1);
    let steps = num_samples.saturating_sub(1);
    (0..num_samples).map(move |i| if steps == 0 { 0 } else { i * last / steps })
}

#[cfg(test)]
mod test {
    use super::*;

    fn reading(len: usize, in_plane: impl Fn(usize) -> bool) -> RawScan {
        let points = (0..len)
            .map(|i| {
                let z = if in_plane(i) { 0.01 } else { 0.3 };
                Vector3::new(i as f64, 0.0, z)
            })
            .collect();
        let ranges = (0..len).map(|i| i as f64).collect();
        RawScan::new(points, ranges)
    }

    fn preprocessor() -> RangeScanPreprocessor {
        RangeScanPreprocessor::new(ScanPreprocessorConfig::default()).unwrap()
    }

    #[test]
    fn test_decimation_indices() {
        let indices: Vec<_> = decimation_indices(970, 720).collect();
        assert_eq!(indices.len(), 720);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[719], 969);
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));

        let indices: Vec<_> = decimation_indices(720, 720).collect();
        assert_eq!(indices, (0..720).collect::<Vec<_>>());

        let indices: Vec<_> = decimation_indices(1, 4).collect();
        assert_eq!(indices, vec![0; 4]);
        assert_eq!(decimation_indices(10, 1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_slice_filter_and_decimation() {
        // 400 of 1000 points lie in the scan plane.
        let raw = reading(1000, |i| i % 5 < 2);
        let scan = preprocessor().process(&raw);
        assert_eq!(scan.points.len(), 720);
        assert_eq!(scan.ranges.len(), 720);
        for (p, r) in scan.points.iter().zip(&scan.ranges) {
            assert!(p.z.abs() <= 0.02);
            assert_eq!(p.x, *r);
        }
        assert_eq!(scan.ranges[0], 0.0);
        assert_eq!(scan.ranges[719], 996.0);
    }

    #[test]
    fn test_candidate_limit() {
        let raw = reading(2000, |_| true);
        let scan = preprocessor().process(&raw);
        assert_eq!(scan.len(), 720);
        assert_eq!(*scan.ranges.last().unwrap(), 969.0);
    }

    #[test]
    fn test_slice_bounds_are_inclusive() {
        let mut raw = reading(3, |_| false);
        raw.points[0].z = -0.02;
        raw.points[2].z = 0.02;
        let scan = preprocessor().process(&raw);
        assert_eq!(scan.len(), 720);
        assert_eq!(scan.ranges[0], 0.0);
        assert_eq!(scan.ranges[719], 2.0);
        assert!(!scan.ranges.contains(&1.0));
    }

    #[test]
    fn test_degenerate_readings() {
        let pre = preprocessor();
        assert!(pre.process(&RawScan::default()).is_empty());
        assert!(pre.process(&reading(100, |_| false)).is_empty());

        let mut mismatched = reading(100, |_| true);
        mismatched.ranges.pop();
        assert!(pre.process(&mismatched).is_empty());
    }

    #[test]
    fn test_process_batch_keeps_order() {
        let mut readings = IndexMap::new();
        readings.insert("env_1/lidar".to_owned(), reading(800, |_| true));
        readings.insert("env_0/lidar".to_owned(), RawScan::default());
        let scans = preprocessor().process_batch(&readings);
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].len(), 720);
        assert!(scans[1].is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let config = ScanPreprocessorConfig {
            num_beams: 0,
            ..Default::default()
        };
        assert!(RangeScanPreprocessor::new(config).is_err());
        let config = ScanPreprocessorConfig {
            z_min: 0.1,
            z_max: -0.1,
            ..Default::default()
        };
        assert!(RangeScanPreprocessor::new(config).is_err());
    }
}
