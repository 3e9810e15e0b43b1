// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Overlay DAG builder.
//!
//! Consumes a stream of blocks in one forward pass and synthesizes linking
//! nodes that reference every observed block as a raw-tagged leaf. Pages of
//! links are flushed under a byte budget and chained backwards through a
//! reserved `"more"` link; the last flushed page is the single root of the
//! output archive.

use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::mem;

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use tracing::debug;

use crate::car::{CarBlock, CarHeader, Error};
use crate::dagpb::{self, PbLink, PbNode, DAG_PB, RAW};
use crate::utils::CancelToken;

/// Accumulated raw-link cid bytes that trigger a page flush. Keeps encoded
/// linking nodes around the 500 kB mark.
pub const LINK_BUDGET: usize = 512 * 1024;

/// Reserved link name chaining a page to the previously flushed one.
pub const CHAIN_LINK_NAME: &str = "more";

const OUTPUT_BUFFER_CAPACITY: usize = 4 << 20;

/// Builds the overlay DAG over a block stream, writing synthesized linking
/// nodes (and, unless shallow, the original blocks) straight through to the
/// output. Only the current page is held in memory.
pub struct OverlayBuilder<W> {
    out: W,
    page: Vec<PbLink>,
    used: usize,
    budget: usize,
    shallow: bool,
    pages: u64,
}

impl<W: Write> OverlayBuilder<W> {
    pub fn new(out: W, shallow: bool) -> Self {
        Self::with_budget(out, shallow, LINK_BUDGET)
    }

    pub fn with_budget(out: W, shallow: bool, budget: usize) -> Self {
        OverlayBuilder {
            out,
            page: Vec::new(),
            used: 0,
            budget,
            shallow,
            pages: 0,
        }
    }

    /// Folds one observed block into the overlay. The block itself passes
    /// through to the output unmodified first, unless in shallow mode. The
    /// leaf link reuses the block's digest under the raw codec, so no
    /// consumer will try to interpret the referenced bytes.
    pub fn add_block(&mut self, block: &CarBlock) -> Result<(), Error> {
        if !self.shallow {
            block.write(&mut self.out)?;
        }

        let raw_cid = Cid::new_v1(RAW, *block.cid.hash());
        self.used += raw_cid.encoded_len();
        self.page.push(PbLink {
            hash: raw_cid.to_bytes(),
            name: String::new(),
            tsize: block.data.len() as u64,
        });
        if self.used > self.budget {
            self.flush_page()?;
        }
        Ok(())
    }

    fn encode_page(&mut self) -> Result<(Cid, Vec<u8>), Error> {
        let node = PbNode {
            links: mem::take(&mut self.page),
        };
        let encoded = node.to_bytes()?;
        let cid = dagpb::cid_of(&encoded);
        Ok((cid, encoded))
    }

    /// Writes the full page out and seeds the next one with a chain link to
    /// it. The chain link counts towards the next page's budget.
    fn flush_page(&mut self) -> Result<(), Error> {
        let (cid, encoded) = self.encode_page()?;
        let tsize = encoded.len() as u64;
        CarBlock { cid, data: encoded }.write(&mut self.out)?;
        self.pages += 1;
        debug!(page = self.pages, cid = %cid, "flushed overlay page");

        self.page.push(PbLink {
            hash: cid.to_bytes(),
            name: CHAIN_LINK_NAME.to_string(),
            tsize,
        });
        self.used = cid.encoded_len();
        Ok(())
    }

    /// Flushes the final page and yields the single overlay root. A builder
    /// that saw no blocks still produces one empty node and a root.
    pub fn finish(mut self) -> Result<(Cid, W), Error> {
        let (root, encoded) = self.encode_page()?;
        CarBlock {
            cid: root,
            data: encoded,
        }
        .write(&mut self.out)?;
        Ok((root, self.out))
    }
}

/// Root for the placeholder header. Same codec and digest family as the real
/// root, so both header records encode to the same number of bytes.
fn placeholder_root() -> Cid {
    Cid::new_v1(DAG_PB, Code::Blake3_256.digest(b"carcara overlay root placeholder"))
}

/// Streams `blocks` into an overlay archive on `out`, then patches the
/// placeholder header in place once the true root is known. The output must
/// therefore be seekable; everything else is a single forward pass.
pub fn write_overlay<I, W>(
    blocks: I,
    mut out: W,
    shallow: bool,
    cancel: &CancelToken,
) -> Result<Cid, Error>
where
    I: IntoIterator<Item = Result<CarBlock, Error>>,
    W: Write + Seek,
{
    let placeholder = CarHeader::from(vec![placeholder_root()]).encode()?;
    out.write_all(&placeholder)?;

    let mut builder = OverlayBuilder::new(
        BufWriter::with_capacity(OUTPUT_BUFFER_CAPACITY, out),
        shallow,
    );
    for block in blocks {
        if cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }
        builder.add_block(&block?)?;
    }
    let (root, buffered) = builder.finish()?;
    let mut out = buffered
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;

    let header = CarHeader::from(vec![root]).encode()?;
    if header.len() != placeholder.len() {
        return Err(Error::HeaderLength {
            expected: placeholder.len(),
            actual: header.len(),
        });
    }
    out.seek(SeekFrom::Start(0))?;
    out.write_all(&header)?;
    out.flush()?;
    Ok(root)
}
