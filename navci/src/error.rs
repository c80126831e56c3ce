use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("navci: Length mismatch (model = {}, input = {})", model, input)]
    LengthMismatch { model: usize, input: usize },
    #[error(
        "navci: Shape mismatch for {}: expected {}, but got {}",
        what,
        expected,
        actual
    )]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("navci: Invalid config {}: {}", name, message)]
    InvalidConfig { name: &'static str, message: String },
    #[error("navci: No Joint={} is found.", .0)]
    NoJoint(String),
    #[error(
        "navci: Instance {} is out of range (num_instances = {})",
        index,
        num_instances
    )]
    InstanceOutOfRange { index: usize, num_instances: usize },
    #[error("navci: Other: {:?}", .0)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
