use crate::metrics::FlattenError;
use std::{
    fmt,
    time::Duration,
};

/// Why a single endpoint poll failed. None of these affect sibling endpoints.
#[derive(thiserror::Error, Debug)]
pub enum PollError {
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid endpoint address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },
    #[error("timed out after {0:?} waiting for response headers from {1}")]
    HeaderTimeout(Duration, String),
    #[error("{0}")]
    Body(#[source] reqwest::Error),
    #[error("Error decoding JSON response")]
    Decode,
    #[error(transparent)]
    Flatten(#[from] FlattenError),
    #[error("poll of {0} did not run to completion")]
    Aborted(String),
}

#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: PollError,
}

/// Every failed endpoint of one gather call, in the order the polls finished.
#[derive(Debug)]
pub struct GatherError {
    failures: Vec<EndpointFailure>,
}

impl GatherError {
    /// `None` when nothing failed.
    pub fn from_failures(failures: Vec<EndpointFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn failures(&self) -> &[EndpointFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<EndpointFailure> {
        self.failures
    }
}

impl fmt::Display for GatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for GatherError {}
