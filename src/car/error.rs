// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Car utility error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to parse CAR file: {0}")]
    ParsingError(String),
    #[error("Invalid CAR file: {0}")]
    InvalidFile(String),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cbor encoding error: {0}")]
    Cbor(String),
    #[error("Dag-pb encoding error: {0}")]
    DagPb(#[from] quick_protobuf::Error),
    #[error("header record length changed from {expected} to {actual} bytes, cannot patch in place")]
    HeaderLength { expected: usize, actual: usize },
    #[error("interrupted")]
    Interrupted,
}

impl From<cid::Error> for Error {
    fn from(err: cid::Error) -> Error {
        Error::ParsingError(err.to_string())
    }
}
