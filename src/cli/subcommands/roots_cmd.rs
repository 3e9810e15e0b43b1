// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::car::CarReader;
use crate::utils::CancelToken;

/// Lists the declared roots of the given CAR files, one per line, per input,
/// in file order.
#[derive(Debug, clap::Args)]
pub struct RootsCommand {
    /// CAR files to inspect
    #[arg(required = true)]
    car_files: Vec<PathBuf>,
}

impl RootsCommand {
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<()> {
        for path in &self.car_files {
            if cancel.is_cancelled() {
                anyhow::bail!("interrupted");
            }
            let reader = CarReader::new(BufReader::new(File::open(path)?))?;
            for root in &reader.header.roots {
                println!("{root}");
            }
        }
        Ok(())
    }
}
