//! CRC-32 checksum used for change detection and import-name suffixes.
//!
//! Not an integrity check: two different inputs may collide, which only
//! costs a skipped write in the dedup path.

/// CRC-32 (IEEE) of `data`.
pub fn checksum(data: impl AsRef<[u8]>) -> u32 {
    crc32fast::hash(data.as_ref())
}
