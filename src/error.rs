// Error types for loading the vendor dataset
//
// Queries never fail; only the load does. A failed load is published to every
// readiness observer, so the error is shared behind an Arc.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VendorError {
    /// HTTP request could not be sent or its body could not be read
    #[error("Failed to fetch {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("Fetch of {location} failed with status: {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },

    /// Local dataset file could not be read
    #[error("Failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// Localization document is not a JSON object of strings
    #[error("Invalid localization document: {0}")]
    Localization(#[from] serde_json::Error),

    /// Could not build the HTTP client
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The background load task died before publishing an outcome
    #[error("Vendor index load task aborted: {0}")]
    LoadTask(String),
}

pub type Result<T> = std::result::Result<T, VendorError>;
