use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("lidarnav-env: navci: {:?}", .0)]
    Navci(#[from] navci::Error),
    #[error("lidarnav-env: No File {:?} is found ({}).", .0, .1)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("lidarnav-env: Failed to parse {:?} as toml ({}).", .0, .1)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
