//! MD5 message digest algorithm.
//!
//! MD5 produces a 128-bit (16-byte) hash value. It is defined in RFC 1321.
//!
//! **Security warning**: MD5 is cryptographically broken and should not be
//! used for security purposes. It is provided only for legacy compatibility
//! and non-security applications (e.g., checksums).

use crate::provider::Digest;
use certkit_types::CryptoError;

/// MD5 output size in bytes.
pub const MD5_OUTPUT_SIZE: usize = 16;

/// MD5 block size in bytes.
pub const MD5_BLOCK_SIZE: usize = 64;

/// Per-step addition constants: floor(2^32 * abs(sin(i+1))).
const T: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613,
    0xfd469501, 0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193,
    0xa679438e, 0x49b40821, 0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d,
    0x02441453, 0xd8a1e681, 0xe7d3fbc8, 0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a, 0xfffa3942, 0x8771f681, 0x6d9d6122,
    0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70, 0x289b7ec6, 0xeaa127fa,
    0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665, 0xf4292244,
    0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb,
    0xeb86d391,
];

/// Per-step left rotation amounts.
const S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9,
    14, 20, 5, 9, 14, 20, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 6, 10, 15,
    21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// MD5 hash context.
#[derive(Clone)]
pub struct Md5 {
    /// Internal state (four 32-bit words: A, B, C, D).
    state: [u32; 4],
    /// Number of bytes processed so far.
    count: u64,
    /// Partial block buffer.
    buffer: [u8; MD5_BLOCK_SIZE],
    /// Number of bytes in the buffer.
    buffer_len: usize,
}

impl Md5 {
    /// Create a new MD5 hash context.
    pub fn new() -> Self {
        Self {
            state: [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476],
            count: 0,
            buffer: [0; MD5_BLOCK_SIZE],
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
            let take = (MD5_BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];
            if self.buffer_len == MD5_BLOCK_SIZE {
                let block = self.buffer;
                self.compress(&block);
                self.buffer_len = 0;
            }
        }

        while data.len() >= MD5_BLOCK_SIZE {
            let (block, rest) = data.split_at(MD5_BLOCK_SIZE);
            let mut b = [0u8; MD5_BLOCK_SIZE];
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

    /// Finalize the hash and return the 16-byte digest.
    pub fn finish(&mut self) -> Result<[u8; MD5_OUTPUT_SIZE], CryptoError> {
        let bit_len = self.count.wrapping_mul(8);

        // Pad to 56 mod 64, then append the bit length little-endian
        let pad = [0u8; MD5_BLOCK_SIZE];
        let pad_len = if self.buffer_len < 56 {
            56 - self.buffer_len
        } else {
            120 - self.buffer_len
        };
        self.update(&[0x80])?;
        self.update(&pad[..pad_len - 1])?;
        self.update(&bit_len.to_le_bytes())?;

        let mut out = [0u8; MD5_OUTPUT_SIZE];
        for (i, word) in self.state.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        Ok(out)
    }

    /// Reset the hash context for a new computation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One-shot: compute the MD5 digest of `data`.
    pub fn digest(data: &[u8]) -> Result<[u8; MD5_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }

    fn compress(&mut self, block: &[u8; MD5_BLOCK_SIZE]) {
        let mut x = [0u32; 16];
        for (i, chunk) in block.chunks_exact(4).enumerate() {
            x[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let [mut a, mut b, mut c, mut d] = self.state;
        for i in 0..64 {
            let (f, g) = match i / 16 {
                0 => ((b & c) | (!b & d), i),
                1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
                2 => (b ^ c ^ d, (3 * i + 5) % 16),
                _ => (c ^ (b | !d), (7 * i) % 16),
            };
            let tmp = d;
            d = c;
            c = b;
            b = b.wrapping_add(
                a.wrapping_add(f)
                    .wrapping_add(T[i])
                    .wrapping_add(x[g])
                    .rotate_left(S[i]),
            );
            a = tmp;
        }

        self.state[0] = self.state[0].wrapping_add(a);
        self.state[1] = self.state[1].wrapping_add(b);
        self.state[2] = self.state[2].wrapping_add(c);
        self.state[3] = self.state[3].wrapping_add(d);
    }
}

impl Digest for Md5 {
    fn output_size(&self) -> usize {
        MD5_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        MD5_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Md5::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < MD5_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: MD5_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Md5::finish(self)?;
        out[..MD5_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }

    fn reset(&mut self) {
        Md5::reset(self)
    }
}
