use auto_impl::auto_impl;

/// Produces the pedestrian-related slice of each observation row.
#[auto_impl(Box, Arc)]
pub trait PedestrianEncoder: Send + Sync {
    /// Number of values written per instance.
    fn width(&self) -> usize;
    /// Fills `out` (exactly `width()` long) for `instance`.
    fn encode(&self, instance: usize, out: &mut [f64]);
}

/// Placeholder encoder that leaves its block at zero.
#[derive(Debug, Clone, Copy)]
pub struct ZeroPedestrianEncoder {
    width: usize,
}

impl ZeroPedestrianEncoder {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl PedestrianEncoder for ZeroPedestrianEncoder {
    fn width(&self) -> usize {
        self.width
    }

    fn encode(&self, _instance: usize, out: &mut [f64]) {
        out.fill(0.0);
    }
}
