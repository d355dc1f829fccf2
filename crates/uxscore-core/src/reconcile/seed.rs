//! Deterministic smoothing noise.
//!
//! The noise for one category is a pure function of
//! `(frame id, iteration, image reference, run id, category)`: the fields are
//! hashed with SHA-256 (NUL-separated, absent image reference as empty), the
//! first eight digest bytes are read big-endian, and the top 53 bits become a
//! uniform value in `[0, 1)`.

use sha2::{Digest, Sha256};

use crate::domain::Category;

/// Composite key identifying one smoothed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedKey<'a> {
    pub frame_id: &'a str,
    pub iteration: u32,
    pub image_ref: Option<&'a str>,
    pub run_id: &'a str,
    pub category: Category,
}

impl SeedKey<'_> {
    fn digest(&self) -> [u8; 32] {
        let iteration = self.iteration.to_string();
        let parts = [
            self.frame_id,
            iteration.as_str(),
            self.image_ref.unwrap_or(""),
            self.run_id,
            self.category.as_str(),
        ];
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    /// Hex digest of the key, for logs and reproducing a value by hand.
    pub fn hex_digest(&self) -> String {
        hex::encode(self.digest())
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&self) -> f64 {
        let digest = self.digest();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let bits = u64::from_be_bytes(head) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    /// Offset in `[-amplitude, amplitude)`.
    pub fn noise(&self, amplitude: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * amplitude
    }
}
