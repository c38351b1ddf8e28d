//! SHA-1 message digest algorithm.
//!
//! SHA-1 produces a 160-bit (20-byte) hash value. It is defined in FIPS 180-4.
//!
//! **Security warning**: SHA-1 is considered cryptographically weak due to
//! demonstrated collision attacks. It is provided for legacy compatibility
//! and should not be used for new security applications.

use crate::provider::Digest;
use certkit_types::CryptoError;

/// SHA-1 output size in bytes.
pub const SHA1_OUTPUT_SIZE: usize = 20;

/// SHA-1 block size in bytes.
pub const SHA1_BLOCK_SIZE: usize = 64;

/// SHA-1 hash context.
#[derive(Clone)]
pub struct Sha1 {
    /// Internal state (five 32-bit words).
    state: [u32; 5],
    /// Number of bytes processed so far.
    count: u64,
    /// Partial block buffer.
    buffer: [u8; SHA1_BLOCK_SIZE],
    /// Number of bytes in the buffer.
    buffer_len: usize,
}

impl Sha1 {
    /// Create a new SHA-1 hash context.
    pub fn new() -> Self {
        Self {
            state: [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0],
            count: 0,
            buffer: [0; SHA1_BLOCK_SIZE],
            buffer_len: 0,
        }
    }

    /// Feed data into the hash computation.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.count = self
            .count
            .checked_add(data.len() as u64)
            .ok_or(CryptoError::InputOverflow)?;

        let mut data = data;
        if self.buffer_len > 0 {
            let take = (SHA1_BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];
            if self.buffer_len == SHA1_BLOCK_SIZE {
                let block = self.buffer;
                self.compress(&block);
                self.buffer_len = 0;
            }
        }

        while data.len() >= SHA1_BLOCK_SIZE {
            let (block, rest) = data.split_at(SHA1_BLOCK_SIZE);
            let mut b = [0u8; SHA1_BLOCK_SIZE];
            b.copy_from_slice(block);
            self.compress(&b);
            data = rest;
        }

        if !data.is_empty() {
            self.buffer[..data.len()].copy_from_slice(data);
            self.buffer_len = data.len();
        }

        Ok(())
    }

    /// Finalize the hash and return the 20-byte digest.
    pub fn finish(&mut self) -> Result<[u8; SHA1_OUTPUT_SIZE], CryptoError> {
        let bit_len = self.count.wrapping_mul(8);

        // Pad to 56 mod 64, then append the bit length big-endian
        let pad = [0u8; SHA1_BLOCK_SIZE];
        let pad_len = if self.buffer_len < 56 {
            56 - self.buffer_len
        } else {
            120 - self.buffer_len
        };
        self.update(&[0x80])?;
        self.update(&pad[..pad_len - 1])?;
        self.update(&bit_len.to_be_bytes())?;

        let mut out = [0u8; SHA1_OUTPUT_SIZE];
        for (i, word) in self.state.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        Ok(out)
    }

    /// Reset the hash context for a new computation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One-shot: compute the SHA-1 digest of `data`.
    pub fn digest(data: &[u8]) -> Result<[u8; SHA1_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }

    fn compress(&mut self, block: &[u8; SHA1_BLOCK_SIZE]) {
        let mut w = [0u32; 80];
        for (i, chunk) in block.chunks_exact(4).enumerate() {
            w[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for t in 16..80 {
            w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
        }

        let [mut a, mut b, mut c, mut d, mut e] = self.state;
        for (t, &wt) in w.iter().enumerate() {
            let (f, k) = match t / 20 {
                0 => ((b & c) | (!b & d), 0x5a827999),
                1 => (b ^ c ^ d, 0x6ed9eba1),
                2 => ((b & c) | (b & d) | (c & d), 0x8f1bbcdc),
                _ => (b ^ c ^ d, 0xca62c1d6),
            };
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(wt);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        self.state[0] = self.state[0].wrapping_add(a);
        self.state[1] = self.state[1].wrapping_add(b);
        self.state[2] = self.state[2].wrapping_add(c);
        self.state[3] = self.state[3].wrapping_add(d);
        self.state[4] = self.state[4].wrapping_add(e);
    }
}

impl Digest for Sha1 {
    fn output_size(&self) -> usize {
        SHA1_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        SHA1_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Sha1::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SHA1_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SHA1_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Sha1::finish(self)?;
        out[..SHA1_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }

    fn reset(&mut self) {
        Sha1::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    // FIPS 180-4 / NIST CAVP known-answer vectors
    #[test]
    fn test_fips_vectors() {
        let cases: &[(&[u8], &str)] = &[
            (b"", "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
            (b"abc", "a9993e364706816aba3e25717850c26c9cd0d89d"),
            (
                b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq",
                "84983e441c3bd26ebaae4aa1f95129e5e54670f1",
            ),
        ];
        for (input, expected) in cases {
            let digest = Sha1::digest(input).unwrap();
            assert_eq!(digest.to_vec(), hex(expected), "SHA1({:?})", input);
        }
    }

    #[test]
    fn test_million_a() {
        // FIPS 180-4: one million repetitions of "a"
        let mut ctx = Sha1::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            ctx.update(&chunk).unwrap();
        }
        let digest = ctx.finish().unwrap();
        assert_eq!(
            digest.to_vec(),
            hex("34aa973cd4c4daa4f61eeb2bdbad27316534016f")
        );
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data = vec![0x5Au8; 150];
        let mut ctx = Sha1::new();
        ctx.update(&data[..1]).unwrap();
        ctx.update(&data[1..64]).unwrap();
        ctx.update(&data[64..]).unwrap();
        assert_eq!(ctx.finish().unwrap(), Sha1::digest(&data).unwrap());
    }
}
