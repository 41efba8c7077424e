use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new opaque entity ID (16 hex chars).
/// Uses an atomic counter for intra-process uniqueness combined with a
/// nanosecond timestamp, hashed via SHA-256 for uniform distribution.
pub fn generate_id() -> String {
    use sha2::{Digest, Sha256};
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(ts.to_le_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}
