//! Stable fingerprint of a compiled filter tree.
#![expect(clippy::cast_possible_truncation)]

use crate::{
    filter::node::{FilterLeaf, FilterNode},
    value::Value,
};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

///
/// FilterFingerprint
///
/// SHA-256 over a canonical tag-encoded stream of the filter tree. Equal
/// trees always produce equal fingerprints, in any process.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FilterFingerprint([u8; 32]);

impl FilterFingerprint {
    #[must_use]
    pub fn as_hex(&self) -> String {
        hex(&self.0)
    }

    /// First eight bytes as hex; used inside aggregation names.
    #[must_use]
    pub fn short_hex(&self) -> String {
        hex(&self.0[..8])
    }
}

impl fmt::Display for FilterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl FilterNode {
    /// Compute a stable fingerprint for this filter tree.
    #[must_use]
    pub fn fingerprint(&self) -> FilterFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"filterfp:v1");
        hash_node(&mut hasher, self);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        FilterFingerprint(out)
    }
}

fn hash_node(hasher: &mut Sha256, node: &FilterNode) {
    match node {
        FilterNode::Leaf(leaf) => hash_leaf(hasher, leaf),
        FilterNode::Combinator { kind, children } => {
            write_tag(hasher, kind.tag());
            write_u32(hasher, children.len() as u32);
            for child in children {
                hash_node(hasher, child);
            }
        }
    }
}

fn hash_leaf(hasher: &mut Sha256, leaf: &FilterLeaf) {
    write_tag(hasher, 0x20);
    write_str(hasher, &leaf.field);
    write_tag(hasher, leaf.op.tag());
    write_value(hasher, &leaf.value);
}

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x30),
        Value::Bool(v) => {
            write_tag(hasher, 0x31);
            write_tag(hasher, u8::from(*v));
        }
        Value::Int(v) => {
            write_tag(hasher, 0x32);
            hasher.update(v.to_be_bytes());
        }
        Value::Uint(v) => {
            write_tag(hasher, 0x33);
            hasher.update(v.to_be_bytes());
        }
        Value::Float(v) => {
            write_tag(hasher, 0x34);
            hasher.update(v.to_bits().to_be_bytes());
        }
        Value::Text(v) => {
            write_tag(hasher, 0x35);
            write_str(hasher, v);
        }
        Value::Enum(v) => {
            write_tag(hasher, 0x36);
            write_str(hasher, v);
        }
        Value::Timestamp(v) => {
            write_tag(hasher, 0x37);
            hasher.update(v.timestamp().to_be_bytes());
            write_u32(hasher, v.timestamp_subsec_nanos());
        }
        Value::List(items) => {
            write_tag(hasher, 0x38);
            write_u32(hasher, items.len() as u32);
            for item in items {
                write_value(hasher, item);
            }
        }
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }

    out
}
