// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::debug;

use crate::car::CarReader;
use crate::overlay::write_overlay;
use crate::utils::CancelToken;

const INPUT_BUFFER_CAPACITY: usize = 1 << 20;

/// Generates an overlay CAR made of a DAG that references all the blocks in
/// the original CAR files as raw-cid leaves. The resulting archive has a
/// single root even when the inputs only carried partial DAGs.
///
/// The output must be a seekable file: its header is patched in place once
/// the overlay root is known.
#[derive(Debug, clap::Args)]
pub struct OverlayCommand {
    /// Only include overlay-DAG blocks, omitting the original blocks
    #[arg(long)]
    shallow: bool,
    /// Name of the CAR file to write to
    #[arg(short, long, default_value = "overlay.car")]
    output: PathBuf,
    /// CAR files to overlay
    #[arg(required = true)]
    car_files: Vec<PathBuf>,
}

impl OverlayCommand {
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<()> {
        let mut readers = Vec::with_capacity(self.car_files.len());
        for path in &self.car_files {
            debug!(path = %path.display(), "opening");
            readers.push(CarReader::new(BufReader::with_capacity(
                INPUT_BUFFER_CAPACITY,
                File::open(path)?,
            ))?);
        }

        let out = File::create(&self.output)?;
        let root = write_overlay(readers.into_iter().flatten(), out, self.shallow, cancel)?;
        debug!(root = %root, output = %self.output.display(), "overlay written");
        Ok(())
    }
}
