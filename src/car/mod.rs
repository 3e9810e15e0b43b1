// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! CARv1 container codec: a varint-framed dag-cbor header record followed by
//! varint-framed `<cid bytes><payload bytes>` block records. Reading and
//! writing are strictly sequential; the codec itself never seeks.

mod error;
pub(crate) mod util;

use std::io::{Read, Write};

use cid::Cid;
use integer_encoding::VarInt;
use multihash_codetable::{Code, MultihashDigest};
use serde::{Deserialize, Serialize};
use serde_ipld_dagcbor::{from_slice, to_vec};

pub use error::*;
use util::{ld_read, ld_write};

/// CAR file header
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarHeader {
    pub roots: Vec<Cid>,
    pub version: u64,
}

impl CarHeader {
    /// Creates a new CAR file header
    pub fn new(roots: Vec<Cid>, version: u64) -> Self {
        Self { roots, version }
    }

    /// Encodes the complete header record, length prefix included. The
    /// overlay command patches exactly these bytes in place.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let body = to_vec(self).map_err(|e| Error::Cbor(e.to_string()))?;
        let mut record = body.len().encode_var_vec();
        record.extend_from_slice(&body);
        Ok(record)
    }

    /// Writes the header record to `writer`.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        let body = to_vec(self).map_err(|e| Error::Cbor(e.to_string()))?;
        ld_write(writer, &body)
    }
}

impl From<Vec<Cid>> for CarHeader {
    fn from(roots: Vec<Cid>) -> Self {
        Self { roots, version: 1 }
    }
}

/// One content-addressed block
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarBlock {
    pub cid: Cid,
    pub data: Vec<u8>,
}

impl CarBlock {
    /// Writes a varint frame containing the cid and the data
    pub fn write(&self, writer: &mut impl Write) -> Result<(), Error> {
        let frame_length = self.cid.encoded_len() + self.data.len();
        writer.write_all(&frame_length.encode_var_vec())?;
        self.cid
            .write_bytes(&mut *writer)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Decodes one block record body: cid followed by the raw payload.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<CarBlock, Error> {
        let mut cursor = std::io::Cursor::new(&bytes);
        let cid = Cid::read_bytes(&mut cursor)
            .map_err(|e| Error::ParsingError(format!("invalid block cid: {e}")))?;
        let data = bytes[cursor.position() as usize..].to_vec();
        Ok(CarBlock { cid, data })
    }

    pub fn valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Recomputes the digest and checks it against the cid.
    pub fn validate(&self) -> Result<(), Error> {
        let code = Code::try_from(self.cid.hash().code())
            .map_err(|e| Error::ParsingError(e.to_string()))?;
        let actual = Cid::new_v1(self.cid.codec(), code.digest(&self.data));
        if actual != self.cid {
            return Err(Error::ParsingError(format!(
                "cid/block mismatch for block {}, actual: {actual}",
                self.cid
            )));
        }
        Ok(())
    }
}

/// Sequential CAR reader. The header is decoded and validated up front.
pub struct CarReader<R> {
    reader: R,
    pub header: CarHeader,
}

impl<R: Read> CarReader<R> {
    /// Creates a new `CarReader` and parses the `CarHeader`
    pub fn new(mut reader: R) -> Result<Self, Error> {
        let buf = ld_read(&mut reader)?
            .ok_or_else(|| Error::ParsingError("failed to parse uvarint for header".to_string()))?;
        let header: CarHeader =
            from_slice(&buf).map_err(|e| Error::ParsingError(e.to_string()))?;
        if header.version != 1 {
            return Err(Error::InvalidFile("CAR file version must be 1".to_string()));
        }
        Ok(CarReader { reader, header })
    }

    /// Returns the next block, or `None` once the archive ends cleanly.
    pub fn next_block(&mut self) -> Result<Option<CarBlock>, Error> {
        match ld_read(&mut self.reader)? {
            Some(frame) => CarBlock::from_bytes(frame).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the next raw block frame without decoding the cid. Used for
    /// byte-exact pass-through.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Vec<u8>>, Error> {
        ld_read(&mut self.reader)
    }
}

impl<R: Read> Iterator for CarReader<R> {
    type Item = Result<CarBlock, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Append-only CAR writer. Writes the header record on construction.
pub struct CarWriter<W> {
    inner: W,
}

impl<W: Write> CarWriter<W> {
    pub fn new(header: &CarHeader, mut writer: W) -> Result<Self, Error> {
        header.write(&mut writer)?;
        Ok(CarWriter { inner: writer })
    }

    pub fn write_block(&mut self, block: &CarBlock) -> Result<(), Error> {
        block.write(&mut self.inner)
    }

    pub(crate) fn write_frame(&mut self, frame: &[u8]) -> Result<(), Error> {
        ld_write(&mut self.inner, frame)
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        Ok(self.inner.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
