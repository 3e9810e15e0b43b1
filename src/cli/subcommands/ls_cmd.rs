// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::debug;

use crate::car::CarReader;
use crate::utils::CancelToken;

/// Lists the block cids of the given CAR files, one per line, in encounter
/// order.
#[derive(Debug, clap::Args)]
pub struct LsCommand {
    /// CAR files to list
    #[arg(required = true)]
    car_files: Vec<PathBuf>,
}

impl LsCommand {
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<()> {
        for path in &self.car_files {
            if cancel.is_cancelled() {
                anyhow::bail!("interrupted");
            }
            debug!(path = %path.display(), "listing blocks");
            let mut reader = CarReader::new(BufReader::new(File::open(path)?))?;
            while let Some(block) = reader.next_block()? {
                println!("{}", block.cid);
            }
        }
        Ok(())
    }
}
