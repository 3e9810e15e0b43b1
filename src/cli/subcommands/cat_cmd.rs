// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use cid::Cid;
use clap::ValueEnum;
use tracing::debug;

use crate::car::{CarHeader, CarReader, CarWriter, Error};
use crate::utils::CancelToken;

const IO_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Which inputs contribute declared roots to the merged header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RootsPolicy {
    All,
    First,
    Last,
}

/// Concatenates the given CAR files into one archive on stdout. Blocks are
/// copied frame-for-frame in file order and are not de-duplicated.
#[derive(Debug, clap::Args)]
pub struct CatCommand {
    /// Roots to include in the merged header
    #[arg(long, value_enum, default_value_t = RootsPolicy::All)]
    roots: RootsPolicy,
    /// CAR files to concatenate, in order
    #[arg(required = true)]
    car_files: Vec<PathBuf>,
}

impl CatCommand {
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<()> {
        let mut per_file_roots = Vec::with_capacity(self.car_files.len());
        for path in &self.car_files {
            let reader = CarReader::new(BufReader::new(File::open(path)?))?;
            per_file_roots.push(reader.header.roots);
        }
        let roots = merge_roots(self.roots, per_file_roots);

        let stdout = std::io::stdout();
        let mut writer = CarWriter::new(
            &CarHeader::from(roots),
            BufWriter::with_capacity(IO_BUFFER_CAPACITY, stdout.lock()),
        )?;

        for path in &self.car_files {
            if cancel.is_cancelled() {
                anyhow::bail!("interrupted");
            }
            debug!(path = %path.display(), "concatenating");
            let mut reader = CarReader::new(BufReader::with_capacity(
                IO_BUFFER_CAPACITY,
                File::open(path)?,
            ))?;
            copy_frames(&mut reader, &mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Copies every remaining block frame verbatim. Cids are never decoded, so
/// duplicate blocks across inputs are kept as-is.
fn copy_frames<R: Read, W: Write>(
    reader: &mut CarReader<R>,
    writer: &mut CarWriter<W>,
) -> Result<(), Error> {
    while let Some(frame) = reader.next_frame()? {
        writer.write_frame(&frame)?;
    }
    Ok(())
}

/// Ordered union with duplicates kept for `all`; only the chosen input's
/// roots for `first`/`last`.
fn merge_roots(policy: RootsPolicy, per_file_roots: Vec<Vec<Cid>>) -> Vec<Cid> {
    match policy {
        RootsPolicy::All => per_file_roots.concat(),
        RootsPolicy::First => per_file_roots.into_iter().next().unwrap_or_default(),
        RootsPolicy::Last => per_file_roots.into_iter().next_back().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use multihash_codetable::{Code, MultihashDigest};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::car::CarBlock;
    use crate::dagpb::RAW;

    const DAG_CBOR: u64 = 0x71;

    fn root(data: &[u8]) -> Cid {
        Cid::new_v1(RAW, Code::Blake3_256.digest(data))
    }

    fn block(data: &[u8]) -> CarBlock {
        CarBlock {
            cid: Cid::new_v1(DAG_CBOR, Code::Blake3_256.digest(data)),
            data: data.to_vec(),
        }
    }

    fn car_bytes(roots: Vec<Cid>, blocks: &[CarBlock]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut writer = CarWriter::new(&CarHeader::from(roots), &mut buf).unwrap();
        for block in blocks {
            writer.write_block(block).unwrap();
        }
        buf
    }

    #[test]
    fn concatenation_keeps_block_order_and_duplicates() {
        let shared = block(b"shared");
        let first = vec![block(b"one"), shared.clone()];
        let second = vec![shared, block(b"two")];
        let a = car_bytes(vec![first[0].cid], &first);
        let b = car_bytes(vec![second[1].cid], &second);

        let mut out = Vec::new();
        let mut writer = CarWriter::new(
            &CarHeader::from(vec![first[0].cid, second[1].cid]),
            &mut out,
        )
        .unwrap();
        for car in [&a, &b] {
            let mut reader = CarReader::new(Cursor::new(car.as_slice())).unwrap();
            copy_frames(&mut reader, &mut writer).unwrap();
        }

        let mut reader = CarReader::new(Cursor::new(&out)).unwrap();
        let decoded: Vec<CarBlock> = (&mut reader).collect::<Result<_, _>>().unwrap();
        // All frames of the first input, then all of the second; the block
        // both inputs carry shows up twice.
        assert_eq!(decoded, [&first[..], &second[..]].concat());
    }

    #[test]
    fn merge_roots_policies() {
        let (r1, r2, r3) = (root(b"r1"), root(b"r2"), root(b"r3"));
        let inputs = vec![vec![r1, r2], vec![r2], vec![r3]];

        assert_eq!(
            merge_roots(RootsPolicy::All, inputs.clone()),
            vec![r1, r2, r2, r3]
        );
        assert_eq!(merge_roots(RootsPolicy::First, inputs.clone()), vec![r1, r2]);
        assert_eq!(merge_roots(RootsPolicy::Last, inputs), vec![r3]);
    }

    #[test]
    fn merge_roots_of_nothing() {
        assert!(merge_roots(RootsPolicy::All, vec![]).is_empty());
        assert!(merge_roots(RootsPolicy::First, vec![]).is_empty());
        assert!(merge_roots(RootsPolicy::Last, vec![]).is_empty());
    }
}
