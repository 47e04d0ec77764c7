// ---------------------------------------------------------------------------
// rule_header – Fixed header in front of every persisted rule set
// ---------------------------------------------------------------------------
//
// Header format (20 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "PKRL"
//   [4..8]   Format version (u32)
//   [8..12]  Record count (u32)
//   [12..16] Payload length in bytes (u32)
//   [16..20] xxHash32 checksum of the payload
//
// Everything after the header is the bitcode-encoded record list.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a parking rule blob.
pub const MAGIC: [u8; 4] = *b"PKRL";

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Current rule blob format version.
pub const RULES_FORMAT_VERSION: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleHeader {
    pub format_version: u32,
    pub record_count: u32,
    pub payload_len: u32,
    pub checksum: u32,
}

impl RuleHeader {
    pub fn new(record_count: u32, payload: &[u8]) -> Self {
        Self {
            format_version: RULES_FORMAT_VERSION,
            record_count,
            payload_len: payload.len() as u32,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.record_count.to_le_bytes());
        out.extend_from_slice(&self.payload_len.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

/// Prepend a header to an encoded payload.
pub fn wrap_with_header(record_count: u32, payload: &[u8]) -> Vec<u8> {
    let header = RuleHeader::new(record_count, payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Validate the header and return it together with the payload slice.
///
/// Rejects foreign data, future versions, short blobs and checksum
/// mismatches. Trailing bytes past the declared payload are ignored.
pub fn unwrap_header(bytes: &[u8]) -> Result<(RuleHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
        return Err(SaveError::BadMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated {
            needed: HEADER_SIZE,
            found: bytes.len(),
        });
    }

    let header = RuleHeader {
        format_version: read_u32(bytes, 4),
        record_count: read_u32(bytes, 8),
        payload_len: read_u32(bytes, 12),
        checksum: read_u32(bytes, 16),
    };

    if header.format_version > RULES_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: RULES_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let end = HEADER_SIZE + header.payload_len as usize;
    if bytes.len() < end {
        return Err(SaveError::Truncated {
            needed: end,
            found: bytes.len(),
        });
    }
    let payload = &bytes[HEADER_SIZE..end];

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            computed,
        });
    }

    Ok((header, payload))
}
