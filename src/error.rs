use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::scanner::ScanError;

/// Fatal failures of a generation pass or of a CLI command.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("found no input file '{}': {source}", path.display())]
    BaseStylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file already exists: {}", path.display())]
    ConfigExists { path: PathBuf },

    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to start watcher: {0}")]
    Watcher(#[source] notify::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
