// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! carcara is a command-line tool to work with content-addressed archive
//! (CAR) files: concatenate them, list their blocks and roots, compute block
//! statistics, and build overlay archives.
//!
//! An overlay archive references every block of the input archives from a
//! single root through raw-tagged links, so even a partial DAG (where some
//! links cannot be resolved) becomes fully traversable without any tooling
//! attempting to interpret the underlying blocks.

pub mod car;
pub mod cli;
pub mod dagpb;
pub mod overlay;
pub mod utils;
