use certdb_core::error::{CertDbError, Result};
use lmdb::{Cursor, Database, Transaction};

/// Key-ordered scan over a database
///
/// Walks keys from the first one in byte order and collects up to `limit`
/// entries whose key passes `filter`. Results are copied out so the read
/// transaction can end before the caller decodes them.
pub struct LmdbKeyScan {
    results: Vec<(Vec<u8>, Vec<u8>)>,
    index: usize,
}

impl LmdbKeyScan {
    pub fn new<T, F>(txn: &T, db: Database, limit: usize, mut filter: F) -> Result<Self>
    where
        T: Transaction,
        F: FnMut(&[u8]) -> bool,
    {
        let mut results = Vec::new();
        if limit == 0 {
            return Ok(Self { results, index: 0 });
        }

        let mut cursor = txn
            .open_ro_cursor(db)
            .map_err(|e| CertDbError::Query(e.to_string()))?;

        for (key, value) in cursor.iter_start() {
            let key_bytes: &[u8] = key;
            let value_bytes: &[u8] = value;
            if !filter(key_bytes) {
                continue;
            }
            results.push((key_bytes.to_vec(), value_bytes.to_vec()));
            if results.len() >= limit {
                break;
            }
        }

        Ok(Self { results, index: 0 })
    }

}

impl Iterator for LmdbKeyScan {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.results.get_mut(self.index).map(std::mem::take)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.results.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LmdbKeyScan {}
