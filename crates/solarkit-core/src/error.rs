//! Error handling for SolarKit.
//!
//! Only store-level mutations carry an error type: looking up entities by
//! id can fail, and catalog keys must be unique. The geometry kernel, the
//! exclusion filter, and the layout engine never return errors: degenerate
//! inputs resolve to a neutral value (`None`, an unchanged polygon, or an
//! empty candidate list).
//!
//! All error types use `thiserror`.

use thiserror::Error;

/// Placement store error type
///
/// Represents failures of store mutations: references to entities that do
/// not exist, or catalog entries that clash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Roof surface id is not present in the store
    #[error("Roof {id} not found")]
    UnknownRoof {
        /// The missing roof id.
        id: u64,
    },

    /// Panel instance id is not present in the store
    #[error("Panel {id} not found")]
    UnknownPanel {
        /// The missing panel id.
        id: u64,
    },

    /// Exclusion zone id is not present in the store
    #[error("Exclusion zone {id} not found")]
    UnknownZone {
        /// The missing zone id.
        id: u64,
    },

    /// Module spec id is not registered in the catalog
    #[error("Module spec '{id}' not registered")]
    UnknownModule {
        /// The missing catalog key.
        id: String,
    },

    /// Module spec id is already registered in the catalog
    #[error("Module spec '{id}' already registered")]
    DuplicateModule {
        /// The clashing catalog key.
        id: String,
    },
}

/// Main error type for SolarKit
#[derive(Error, Debug)]
pub enum Error {
    /// Placement store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
