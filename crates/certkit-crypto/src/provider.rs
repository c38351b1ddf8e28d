//! Trait-based provider mechanism for cryptographic algorithms.
//!
//! These traits define the abstract interfaces that all algorithm
//! implementations must satisfy, so callers can dispatch over an
//! algorithm chosen at runtime (for example from a decoded
//! AlgorithmIdentifier) without knowing the concrete type.

use certkit_types::CryptoError;

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the hash state to process a new message.
    fn reset(&mut self);
}
