// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Minimal dag-pb codec for overlay linking nodes.
//!
//! An overlay node is a `PBNode` carrying only links, no inline data. Links
//! encode in insertion order, so a chained page always starts with its
//! `"more"` link. The message impls follow the protobuf wire schema of
//! dag-pb: `PBLink { Hash = 1 (bytes), Name = 2 (string), Tsize = 3
//! (uint64) }`, `PBNode { Links = 2 (repeated PBLink) }`.

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use quick_protobuf::sizeofs::{sizeof_len, sizeof_varint};
use quick_protobuf::{MessageWrite, Writer, WriterBackend};
#[cfg(test)]
use quick_protobuf::{BytesReader, MessageRead};

/// Multicodec for dag-pb encoded nodes.
pub const DAG_PB: u64 = 0x70;
/// Multicodec marking a payload as uninterpreted raw bytes.
pub const RAW: u64 = 0x55;

/// A named, sized reference to another block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PbLink {
    pub hash: Vec<u8>,
    pub name: String,
    pub tsize: u64,
}

/// A linking node without inline payload.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PbNode {
    pub links: Vec<PbLink>,
}

impl MessageWrite for PbLink {
    fn get_size(&self) -> usize {
        1 + sizeof_len(self.hash.len()) + 1 + sizeof_len(self.name.len()) + 1
            + sizeof_varint(self.tsize)
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> quick_protobuf::Result<()> {
        w.write_with_tag(10, |w| w.write_bytes(&self.hash))?;
        w.write_with_tag(18, |w| w.write_string(&self.name))?;
        w.write_with_tag(24, |w| w.write_varint(self.tsize))?;
        Ok(())
    }
}

// Decoding is only needed to check what was written; nothing outside of
// tests ever interprets a node.
#[cfg(test)]
impl<'a> MessageRead<'a> for PbLink {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> quick_protobuf::Result<Self> {
        let mut msg = PbLink::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(10) => msg.hash = r.read_bytes(bytes)?.to_vec(),
                Ok(18) => msg.name = r.read_string(bytes)?.to_owned(),
                Ok(24) => msg.tsize = r.read_varint64(bytes)?,
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for PbNode {
    fn get_size(&self) -> usize {
        self.links
            .iter()
            .map(|link| 1 + sizeof_len(link.get_size()))
            .sum()
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> quick_protobuf::Result<()> {
        for link in &self.links {
            w.write_with_tag(18, |w| w.write_message(link))?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl<'a> MessageRead<'a> for PbNode {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> quick_protobuf::Result<Self> {
        let mut msg = PbNode::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(18) => msg.links.push(r.read_message::<PbLink>(bytes)?),
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

impl PbNode {
    /// Canonical encoding of this node, without any framing.
    pub fn to_bytes(&self) -> quick_protobuf::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.get_size());
        let mut writer = Writer::new(&mut buf);
        self.write_message(&mut writer)?;
        Ok(buf)
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: &[u8]) -> quick_protobuf::Result<PbNode> {
        let mut reader = BytesReader::from_bytes(bytes);
        PbNode::from_reader(&mut reader, bytes)
    }
}

/// Identifier of an encoded node: CIDv1, dag-pb codec, blake3-256 digest.
pub fn cid_of(encoded: &[u8]) -> Cid {
    Cid::new_v1(DAG_PB, Code::Blake3_256.digest(encoded))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BLAKE3: u64 = 0x1e;

    fn leaf_cid(data: &[u8]) -> Cid {
        Cid::new_v1(RAW, Code::Blake3_256.digest(data))
    }

    #[test]
    fn empty_node_encodes_to_no_bytes() {
        let node = PbNode::default();
        assert_eq!(node.get_size(), 0);
        assert!(node.to_bytes().unwrap().is_empty());
    }

    #[test]
    fn single_link_wire_format() {
        let cid = leaf_cid(b"leaf");
        let node = PbNode {
            links: vec![PbLink {
                hash: cid.to_bytes(),
                name: String::new(),
                tsize: 3,
            }],
        };

        // Raw blake3 CIDv1 is always 36 bytes, so the link body is
        // 2 + 36 (Hash) + 2 (empty Name) + 2 (Tsize).
        let mut expected = vec![0x12, 42, 0x0a, 36];
        expected.extend(cid.to_bytes());
        expected.extend([0x12, 0x00, 0x18, 0x03]);

        assert_eq!(node.to_bytes().unwrap(), expected);
    }

    #[test]
    fn chain_link_wire_format() {
        let cid = leaf_cid(b"previous page");
        let node = PbNode {
            links: vec![PbLink {
                hash: cid.to_bytes(),
                name: "more".to_string(),
                tsize: 1000,
            }],
        };

        let mut expected = vec![0x12, 47, 0x0a, 36];
        expected.extend(cid.to_bytes());
        expected.extend([0x12, 0x04]);
        expected.extend(b"more");
        // 1000 = 0xe8 0x07 as a varint
        expected.extend([0x18, 0xe8, 0x07]);

        assert_eq!(node.to_bytes().unwrap(), expected);
    }

    #[test]
    fn node_roundtrip() {
        let node = PbNode {
            links: vec![
                PbLink {
                    hash: leaf_cid(b"chain").to_bytes(),
                    name: "more".to_string(),
                    tsize: 512,
                },
                PbLink {
                    hash: leaf_cid(b"a").to_bytes(),
                    name: String::new(),
                    tsize: 1,
                },
                PbLink {
                    hash: leaf_cid(b"b").to_bytes(),
                    name: String::new(),
                    tsize: 2,
                },
            ],
        };
        let encoded = node.to_bytes().unwrap();
        assert_eq!(PbNode::from_bytes(&encoded).unwrap(), node);
    }

    #[test]
    fn node_cid_is_dagpb_blake3() {
        let cid = cid_of(b"");
        assert_eq!(cid.codec(), DAG_PB);
        assert_eq!(cid.hash().code(), BLAKE3);
        assert_eq!(cid.hash().size(), 32);
        assert_eq!(cid.encoded_len(), 36);
    }
}
