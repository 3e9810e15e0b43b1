// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::{Read, Write};

use integer_encoding::VarInt;

use super::error::Error;

// Max size of a u64 varint
const U64_LEN: usize = 10;

/// Reads one unsigned varint. A clean EOF before the first byte means the
/// stream ended at a record boundary and yields `None`; an EOF in the middle
/// of a varint is a format error.
pub(crate) fn read_varint_u64<R: Read>(reader: &mut R) -> Result<Option<u64>, Error> {
    let mut result: u64 = 0;

    for i in 0..U64_LEN {
        let mut buf = [0u8; 1];
        if let Err(err) = reader.read_exact(&mut buf) {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                if i == 0 {
                    return Ok(None);
                }
                return Err(Error::ParsingError(
                    "truncated varint length prefix".to_string(),
                ));
            }
            return Err(err.into());
        }

        let byte = buf[0];
        result |= u64::from(byte & 0b0111_1111) << (i * 7);

        // Last byte has the leftmost bit unset
        if byte & 0b1000_0000 == 0 {
            return Ok(Some(result));
        }
    }

    Err(Error::ParsingError(
        "varint length prefix overflows u64".to_string(),
    ))
}

/// Reads one length-prefixed record. `None` on a clean EOF at a record
/// boundary. The payload is read through `take`, so a bogus length prefix
/// cannot trigger an over-allocation; it is caught as an overrun instead.
pub(crate) fn ld_read<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, Error> {
    let len = match read_varint_u64(reader)? {
        Some(len) => len,
        None => return Ok(None),
    };

    let mut buf = Vec::new();
    reader.take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(Error::ParsingError(format!(
            "record length {len} overruns end of file"
        )));
    }
    Ok(Some(buf))
}

/// Appends one length-prefixed record.
pub(crate) fn ld_write<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), Error> {
    writer.write_all(&bytes.len().encode_var_vec())?;
    writer.write_all(bytes)?;
    Ok(())
}
