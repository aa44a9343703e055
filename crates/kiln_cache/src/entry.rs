//! Binary encoding of cache entries.
//!
//! Every entry starts with a 4-byte little-endian header length, followed by a
//! bincode-encoded [`EntryHeader`] and the bincode-encoded value. The header
//! identifies the file as a Kiln cache entry and records the format and tool
//! version that wrote it, so entries from an incompatible build are rejected
//! instead of being misread.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a Kiln cache entry.
const ENTRY_MAGIC: [u8; 4] = *b"KILN";

/// Current entry format version. Increment on breaking changes to the layout.
const ENTRY_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Magic bytes: must be `b"KILN"`.
    pub magic: [u8; 4],

    /// Entry format version.
    pub format_version: u32,

    /// Kiln version that produced this entry.
    pub kiln_version: String,
}

impl EntryHeader {
    /// Creates the header written by the given Kiln version.
    pub fn current(kiln_version: &str) -> Self {
        Self {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            kiln_version: kiln_version.to_string(),
        }
    }
}

/// Encodes `value` into the on-disk entry format.
pub fn encode<T: Serialize + ?Sized>(value: &T, kiln_version: &str) -> Result<Vec<u8>, CacheError> {
    let config = bincode::config::standard();
    let header_bytes = bincode::serde::encode_to_vec(EntryHeader::current(kiln_version), config)
        .map_err(|e| CacheError::Encode {
            reason: e.to_string(),
        })?;
    let payload = bincode::serde::encode_to_vec(value, config).map_err(|e| CacheError::Encode {
        reason: e.to_string(),
    })?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| CacheError::Encode {
        reason: "entry header too large".to_string(),
    })?;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Decodes an entry read from `path`, validating its header.
///
/// A foreign magic, format version or Kiln version yields
/// [`CacheError::InvalidHeader`]; truncated or garbled bytes yield
/// [`CacheError::Decode`].
pub fn decode<T: DeserializeOwned>(
    path: &Path,
    raw: &[u8],
    kiln_version: &str,
) -> Result<T, CacheError> {
    let decode_err = |reason: String| CacheError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let header_err = |reason: String| CacheError::InvalidHeader {
        path: path.to_path_buf(),
        reason,
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| decode_err("entry shorter than its length prefix".to_string()))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_end = 4usize
        .checked_add(header_len)
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| decode_err("truncated entry header".to_string()))?;

    let config = bincode::config::standard();
    let (header, _): (EntryHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..header_end], config)
            .map_err(|e| header_err(e.to_string()))?;

    if header.magic != ENTRY_MAGIC {
        return Err(header_err("missing magic bytes".to_string()));
    }
    if header.format_version != ENTRY_FORMAT_VERSION {
        return Err(header_err(format!(
            "format version {} (expected {ENTRY_FORMAT_VERSION})",
            header.format_version
        )));
    }
    if header.kiln_version != kiln_version {
        return Err(header_err(format!(
            "written by kiln {} (running {kiln_version})",
            header.kiln_version
        )));
    }

    let (value, read) = bincode::serde::decode_from_slice(&raw[header_end..], config)
        .map_err(|e| decode_err(e.to_string()))?;
    if header_end + read != raw.len() {
        return Err(decode_err("trailing bytes after payload".to_string()));
    }
    Ok(value)
}
