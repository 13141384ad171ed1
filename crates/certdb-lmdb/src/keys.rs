use certdb_core::error::{CertDbError, Result};

/// Largest key LMDB accepts with its default build settings
pub const MAX_KEY_SIZE: usize = 511;

/// Domain as an LMDB key
///
/// LMDB rejects empty keys and keys over [`MAX_KEY_SIZE`] bytes; both are
/// reported as a failed upsert for that domain.
pub fn domain_key(domain: &str) -> Result<&[u8]> {
    let key = domain.as_bytes();
    if key.is_empty() {
        return Err(CertDbError::upsert_failed(domain, "empty domain key"));
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(CertDbError::upsert_failed(
            domain,
            format!("key is {} bytes, limit is {}", key.len(), MAX_KEY_SIZE),
        ));
    }
    Ok(key)
}

/// Case-insensitive (ASCII) substring match, mirroring SQLite's LIKE
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
