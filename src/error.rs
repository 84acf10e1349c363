//! Error types
use std::{convert::From, io, result};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request to the device failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Could not parse the response received from the device: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Not supported by the device: {0}")]
    Unsupported(String),
    #[error("Could not resolve the local address: {0}")]
    IO(#[from] io::Error),
    #[error("Could not start the scan workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn unsupported(what: &str) -> Self {
        Error::Unsupported(what.to_string())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

pub type Result<T> = result::Result<T, Error>;
