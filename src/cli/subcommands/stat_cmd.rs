// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::debug;

use crate::car::CarReader;
use crate::utils::CancelToken;

/// Prints block count, root count and block size statistics accumulated over
/// all the given CAR files.
#[derive(Debug, clap::Args)]
pub struct StatCommand {
    /// CAR files to inspect
    #[arg(required = true)]
    car_files: Vec<PathBuf>,
}

impl StatCommand {
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<()> {
        let mut summary = StatSummary::default();
        for path in &self.car_files {
            if cancel.is_cancelled() {
                anyhow::bail!("interrupted");
            }
            debug!(path = %path.display(), "scanning");
            let mut reader = CarReader::new(BufReader::new(File::open(path)?))?;
            summary.record_roots(reader.header.roots.len());
            while let Some(block) = reader.next_block()? {
                summary.record_block(block.data.len() as u64);
            }
        }

        println!("blocks: {}", summary.blocks);
        println!("roots: {}", summary.roots);
        println!("size: {} B", summary.size);
        println!("min: {} B", summary.min);
        println!("max: {} B", summary.max);
        println!("avg: {} B", summary.avg());
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct StatSummary {
    blocks: u64,
    roots: u64,
    size: u64,
    min: u64,
    max: u64,
}

impl StatSummary {
    fn record_roots(&mut self, count: usize) {
        self.roots += count as u64;
    }

    fn record_block(&mut self, len: u64) {
        self.min = if self.blocks == 0 { len } else { self.min.min(len) };
        self.max = self.max.max(len);
        self.blocks += 1;
        self.size += len;
    }

    fn avg(&self) -> u64 {
        self.size.checked_div(self.blocks).unwrap_or_default()
    }
}
