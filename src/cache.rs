//! Result cache for processed documents
//!
//! Memoizes the full [`ProcessingResult`] by a key derived from the uploaded
//! document, so identical uploads are never reprocessed.
//!
//! ## Key derivation
//!
//! - **Content digest**: SHA-256 of the document bytes (default)
//! - **Metadata**: deterministic 32-bit hash over file name, size,
//!   modification time and media type, for callers that cannot afford to
//!   hash large payloads
//!
//! ## Usage Examples
//!
//! ```rust
//! use just_receipts::cache::{content_digest_key, ResultCache};
//!
//! let cache = ResultCache::new();
//! let key = content_digest_key(b"receipt bytes");
//! assert!(cache.get(&key).is_none());
//! assert_eq!(cache.stats().misses, 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::ProcessingResult;
use crate::pipeline_config::CacheKeyMode;
use crate::source_document::SourceDocument;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Total number of entries
    pub entries: usize,
    /// Number of hits
    pub hits: u64,
    /// Number of misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// SHA-256 of the document bytes, hex encoded
pub fn content_digest_key(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Deterministic fallback key over document metadata.
///
/// Uses the classic `hash * 31 + char` string hash on 32-bit signed
/// arithmetic, prefixed so it can never collide with a digest key.
///
/// # Examples
///
/// ```
/// use just_receipts::cache::fallback_cache_key;
///
/// let a = fallback_cache_key("receipt.png", 1024, 1_700_000_000_000, "image/png");
/// let b = fallback_cache_key("receipt.png", 1024, 1_700_000_000_000, "image/png");
/// assert_eq!(a, b);
/// assert!(a.starts_with("meta-"));
/// ```
pub fn fallback_cache_key(file_name: &str, size: u64, modified_unix_ms: i64, media_type: &str) -> String {
    let material = format!("{}-{}-{}-{}", file_name, size, modified_unix_ms, media_type);
    let hash = material.chars().fold(0i32, |hash, c| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(c as i32)
    });
    format!("meta-{}", hash.unsigned_abs())
}

/// Cache key for a document under the configured derivation
pub fn cache_key(document: &SourceDocument, mode: CacheKeyMode) -> String {
    match mode {
        CacheKeyMode::ContentDigest => content_digest_key(document.bytes()),
        CacheKeyMode::Metadata => fallback_cache_key(
            document.file_name().unwrap_or_default(),
            document.size(),
            document.modified_unix_ms().unwrap_or_default(),
            document.media_type(),
        ),
    }
}

/// Thread-safe, write-once result cache. Entries are never invalidated.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    data: Arc<RwLock<HashMap<String, ProcessingResult>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a result, counting the hit or miss
    pub fn get(&self, key: &str) -> Option<ProcessingResult> {
        let found = self.data.read().get(key).cloned();
        let mut stats = self.stats.write();
        match found {
            Some(result) => {
                stats.hits += 1;
                Some(result)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Store a result unless the key is already present.
    ///
    /// Returns the stored result, which is the earlier one when two
    /// identical documents were processed concurrently.
    pub fn insert(&self, key: String, result: ProcessingResult) -> ProcessingResult {
        let mut data = self.data.write();
        let stored = data.entry(key).or_insert(result).clone();
        debug!(entries = data.len(), "Result cached");
        stored
    }

    /// Whether a key is cached, without touching the statistics
    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.entries = self.len();

        let total_requests = stats.hits + stats.misses;
        if total_requests > 0 {
            stats.hit_rate = stats.hits as f64 / total_requests as f64;
        }

        stats
    }

    /// Clear all entries and statistics
    pub fn clear(&self) {
        self.data.write().clear();
        *self.stats.write() = CacheStats::default();
    }
}
