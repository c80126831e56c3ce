use lidarnav_base::normalize_symmetric;
use navci::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Scan;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TemporalPoolConfig {
    /// Number of consecutive scans reduced into one feature.
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Number of contiguous beam bins per scan.
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
    /// How many times the pooled grid is repeated in the feature.
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    /// Ranges in `[saturation_min, saturation_max]` are mapped onto `[-1, 1]`.
    #[serde(default = "default_saturation_min")]
    pub saturation_min: f64,
    #[serde(default = "default_saturation_max")]
    pub saturation_max: f64,
}

impl Default for TemporalPoolConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            num_bins: default_num_bins(),
            replicas: default_replicas(),
            saturation_min: default_saturation_min(),
            saturation_max: default_saturation_max(),
        }
    }
}

fn default_depth() -> usize {
    10
}

fn default_num_bins() -> usize {
    80
}

fn default_replicas() -> usize {
    4
}

fn default_saturation_min() -> f64 {
    0.0
}

fn default_saturation_max() -> f64 {
    30.0
}

impl TemporalPoolConfig {
    /// Number of values of the min/mean grid (`2 * depth` rows of `num_bins`).
    pub fn grid_len(&self) -> usize {
        2 * self.depth * self.num_bins
    }

    pub fn feature_width(&self) -> usize {
        self.grid_len() * self.replicas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Fewer than `depth` scans are stored.
    Filling,
    /// The history has just been reduced into a feature.
    Ready,
}

/// Outcome of one [`TemporalPoolBuffer::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct PoolingResult {
    /// `true` when every instance produced a pooled feature this tick.
    pub pooling_flag: bool,
    skipped: bool,
    ready: Vec<bool>,
    feature_width: usize,
    features: Vec<f64>,
}

impl PoolingResult {
    fn skipped(num_instances: usize, feature_width: usize) -> Self {
        Self {
            pooling_flag: false,
            skipped: true,
            ready: vec![false; num_instances],
            feature_width,
            features: vec![],
        }
    }

    /// `true` when the tick was dropped because of degenerate input.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn ready(&self) -> &[bool] {
        &self.ready
    }

    pub fn is_ready(&self, instance: usize) -> bool {
        self.ready.get(instance).copied().unwrap_or(false)
    }

    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    /// Normalized pooled feature of `instance`, if it was produced this tick.
    pub fn feature(&self, instance: usize) -> Option<&[f64]> {
        if self.is_ready(instance) {
            let start = instance * self.feature_width;
            Some(&self.features[start..start + self.feature_width])
        } else {
            None
        }
    }
}

/// Per-instance sliding window of range scans reduced by min/mean pooling.
///
/// Histories live in one arena of `num_instances * depth * num_beams` values.
/// Each instance owns `depth` slots used as a ring with a write cursor.
#[derive(Debug, Clone)]
pub struct TemporalPoolBuffer {
    config: TemporalPoolConfig,
    num_instances: usize,
    num_beams: usize,
    arena: Vec<f64>,
    /// Next slot to write, per instance.
    cursors: Vec<usize>,
    lens: Vec<usize>,
    states: Vec<PoolState>,
}

impl TemporalPoolBuffer {
    pub fn new(
        num_instances: usize,
        num_beams: usize,
        config: TemporalPoolConfig,
    ) -> Result<Self, Error> {
        for (name, value) in [
            ("depth", config.depth),
            ("num_bins", config.num_bins),
            ("replicas", config.replicas),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig {
                    name,
                    message: "must be positive".to_owned(),
                });
            }
        }
        if num_beams == 0 || num_beams % config.num_bins != 0 {
            return Err(Error::InvalidConfig {
                name: "num_bins",
                message: format!(
                    "{num_beams} beams cannot be split into {} bins",
                    config.num_bins
                ),
            });
        }
        if config.saturation_max <= config.saturation_min {
            return Err(Error::InvalidConfig {
                name: "saturation_max",
                message: format!(
                    "must be larger than saturation_min ({} <= {})",
                    config.saturation_max, config.saturation_min
                ),
            });
        }
        Ok(Self {
            config,
            num_instances,
            num_beams,
            arena: vec![0.0; num_instances * config.depth * num_beams],
            cursors: vec![0; num_instances],
            lens: vec![0; num_instances],
            states: vec![PoolState::Filling; num_instances],
        })
    }

    pub fn config(&self) -> &TemporalPoolConfig {
        &self.config
    }

    pub fn num_instances(&self) -> usize {
        self.num_instances
    }

    pub fn feature_width(&self) -> usize {
        self.config.feature_width()
    }

    /// Number of stored scans of `instance`, always in `[0, depth)` between ticks.
    pub fn len(&self, instance: usize) -> usize {
        self.lens[instance]
    }

    pub fn state(&self, instance: usize) -> PoolState {
        self.states[instance]
    }

    /// Stored range scans of `instance`, oldest first.
    pub fn history(&self, instance: usize) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.lens[instance]).map(move |n| self.frame(instance, n))
    }

    fn slot(&self, instance: usize, slot: usize) -> std::ops::Range<usize> {
        let start = (instance * self.config.depth + slot) * self.num_beams;
        start..start + self.num_beams
    }

    /// `n`-th stored scan of `instance`, 0 being the oldest.
    fn frame(&self, instance: usize, n: usize) -> &[f64] {
        let depth = self.config.depth;
        let slot = (self.cursors[instance] + depth - self.lens[instance] + n) % depth;
        &self.arena[self.slot(instance, slot)]
    }

    /// Appends one scan per instance and pools every full history.
    ///
    /// If the batch does not hold exactly one `num_beams` scan per instance,
    /// the tick is skipped and the histories of every instance are cleared,
    /// so pooling starts over after `depth` valid ticks.
    pub fn push(&mut self, scans: &[Scan]) -> PoolingResult {
        let feature_width = self.feature_width();
        if scans.len() != self.num_instances {
            debug!(
                expected = self.num_instances,
                actual = scans.len(),
                "batch size mismatch, clearing scan histories"
            );
            self.reset_all();
            return PoolingResult::skipped(self.num_instances, feature_width);
        }
        if let Some(instance) = scans.iter().position(|s| s.len() != self.num_beams) {
            debug!(
                instance,
                len = scans[instance].len(),
                "degenerate scan, clearing scan histories"
            );
            self.reset_all();
            return PoolingResult::skipped(self.num_instances, feature_width);
        }

        let depth = self.config.depth;
        for (instance, scan) in scans.iter().enumerate() {
            let range = self.slot(instance, self.cursors[instance]);
            self.arena[range].copy_from_slice(&scan.ranges);
            self.cursors[instance] = (self.cursors[instance] + 1) % depth;
            self.lens[instance] += 1;
        }

        let mut ready = vec![false; self.num_instances];
        let mut features = vec![0.0; self.num_instances * feature_width];
        let mut grid = vec![0.0; self.config.grid_len()];
        for instance in 0..self.num_instances {
            if self.lens[instance] < depth {
                self.states[instance] = PoolState::Filling;
                continue;
            }
            write_grid(self.history(instance), self.config.num_bins, &mut grid);
            let out = &mut features[instance * feature_width..(instance + 1) * feature_width];
            write_feature(&grid, &self.config, out);
            // The oldest slot is the next one to be written.
            self.lens[instance] = depth - 1;
            self.states[instance] = PoolState::Ready;
            ready[instance] = true;
        }

        let pooling_flag = ready.iter().all(|r| *r);
        trace!(pooling_flag, ?self.lens, "pushed scans");
        PoolingResult {
            pooling_flag,
            skipped: false,
            ready,
            feature_width,
            features,
        }
    }

    /// Empties the histories of `instances`, leaving the others untouched.
    pub fn reset(&mut self, instances: &[usize]) -> Result<(), Error> {
        if let Some(&index) = instances.iter().find(|i| **i >= self.num_instances) {
            return Err(Error::InstanceOutOfRange {
                index,
                num_instances: self.num_instances,
            });
        }
        for &instance in instances {
            self.cursors[instance] = 0;
            self.lens[instance] = 0;
            self.states[instance] = PoolState::Filling;
        }
        debug!(?instances, "reset scan histories");
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.cursors.fill(0);
        self.lens.fill(0);
        self.states.fill(PoolState::Filling);
    }
}

/// Reduces consecutive range scans into a min/mean grid.
///
/// Scan `n` is split into `num_bins` contiguous bins; row `2n` of `grid`
/// receives the bin minima and row `2n + 1` the bin means.
///
/// Fails unless every scan splits evenly into `num_bins` non-empty bins and
/// `grid` has two rows for every scan.
pub fn pool_frames<I>(frames: I, num_bins: usize, grid: &mut [f64]) -> Result<(), Error>
where
    I: IntoIterator,
    I::Item: AsRef<[f64]>,
{
    let frames: Vec<I::Item> = frames.into_iter().collect();
    if num_bins == 0 {
        return Err(Error::InvalidConfig {
            name: "num_bins",
            message: "must be positive".to_owned(),
        });
    }
    for frame in &frames {
        let len = frame.as_ref().len();
        if len == 0 || len % num_bins != 0 {
            return Err(Error::ShapeMismatch {
                what: "scan length (multiple of num_bins)",
                expected: (len / num_bins).max(1) * num_bins,
                actual: len,
            });
        }
    }
    let required = 2 * num_bins * frames.len();
    if grid.len() < required {
        return Err(Error::ShapeMismatch {
            what: "pooled grid length",
            expected: required,
            actual: grid.len(),
        });
    }
    write_grid(frames, num_bins, grid);
    Ok(())
}

/// Same as [`pool_frames`] for inputs already checked by the caller.
fn write_grid<I>(frames: I, num_bins: usize, grid: &mut [f64])
where
    I: IntoIterator,
    I::Item: AsRef<[f64]>,
{
    for (n, frame) in frames.into_iter().enumerate() {
        let frame = frame.as_ref();
        let bin_width = frame.len() / num_bins;
        for (b, bin) in frame.chunks_exact(bin_width).take(num_bins).enumerate() {
            let min = bin.iter().copied().fold(f64::INFINITY, f64::min);
            let mean = bin.iter().sum::<f64>() / bin_width as f64;
            grid[2 * n * num_bins + b] = min;
            grid[(2 * n + 1) * num_bins + b] = mean;
        }
    }
}

/// Tiles the normalized grid `replicas` times into `out`.
fn write_feature(grid: &[f64], config: &TemporalPoolConfig, out: &mut [f64]) {
    for chunk in out.chunks_exact_mut(grid.len()) {
        for (o, g) in chunk.iter_mut().zip(grid) {
            *o = normalize_symmetric(*g, config.saturation_min, config.saturation_max);
        }
    }
}
