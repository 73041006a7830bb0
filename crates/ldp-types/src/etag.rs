use std::fmt;

use serde::{Deserialize, Serialize};

/// An HTTP-style entity tag.
///
/// RDF representations carry weak tags (semantically equivalent serializations
/// may differ byte-wise); raw binary content carries strong tags.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTag {
    value: String,
    weak: bool,
}

impl EntityTag {
    pub fn weak(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            weak: true,
        }
    }

    pub fn strong(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            weak: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Weak comparison: opaque values match regardless of weakness.
    pub fn matches(&self, other: &EntityTag) -> bool {
        self.value == other.value
    }

    /// Parse the `W/"..."` or `"..."` header form.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (weak, rest) = match header.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, header),
        };
        let value = rest.strip_prefix('"')?.strip_suffix('"')?;
        Some(Self {
            value: value.to_string(),
            weak,
        })
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.value)
        } else {
            write!(f, "\"{}\"", self.value)
        }
    }
}

/// Domain-separated BLAKE3 digest used to derive entity tags.
///
/// Every part is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// produce different digests.
pub struct TagHasher {
    domain: &'static str,
}

impl TagHasher {
    /// Hasher for RDF representations.
    pub const RDF: Self = Self {
        domain: "ldp-rdf-etag-v1",
    };
    /// Hasher for binary content.
    pub const BINARY: Self = Self {
        domain: "ldp-binary-etag-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hex digest over the given parts.
    pub fn digest<I, P>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            let bytes = part.as_ref();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        hex::encode(&hasher.finalize().as_bytes()[..16])
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
