//! MD2 message digest algorithm.
//!
//! MD2 produces a 128-bit (16-byte) hash value. It is defined in RFC 1319.
//!
//! **Security warning**: MD2 is cryptographically broken and should not be
//! used for security purposes. It is provided only so that signatures on
//! legacy certificates (md2WithRSAEncryption) can still be checked.

use crate::provider::Digest;
use certkit_types::CryptoError;

/// MD2 output size in bytes.
pub const MD2_OUTPUT_SIZE: usize = 16;

/// MD2 block size in bytes.
pub const MD2_BLOCK_SIZE: usize = 16;

/// Substitution table derived from the digits of pi (RFC 1319).
const PI_SUBST: [u8; 256] = [
    41, 46, 67, 201, 162, 216, 124, 1, 61, 54, 84, 161, 236, 240, 6, 19, 98, 167, 5, 243, 192,
    199, 115, 140, 152, 147, 43, 217, 188, 76, 130, 202, 30, 155, 87, 60, 253, 212, 224, 22, 103,
    66, 111, 24, 138, 23, 229, 18, 190, 78, 196, 214, 218, 158, 222, 73, 160, 251, 245, 142, 187,
    47, 238, 122, 169, 104, 121, 145, 21, 178, 7, 63, 148, 194, 16, 137, 11, 34, 95, 33, 128, 127,
    93, 154, 90, 144, 50, 39, 53, 62, 204, 231, 191, 247, 151, 3, 255, 25, 48, 179, 72, 165, 181,
    209, 215, 94, 146, 42, 172, 86, 170, 198, 79, 184, 56, 210, 150, 164, 125, 182, 118, 252, 107,
    226, 156, 116, 4, 241, 69, 157, 112, 89, 100, 113, 135, 32, 134, 91, 207, 101, 230, 45, 168,
    2, 27, 96, 37, 173, 174, 176, 185, 246, 28, 70, 97, 105, 52, 64, 126, 15, 85, 71, 163, 35,
    221, 81, 175, 58, 195, 92, 249, 206, 186, 197, 234, 38, 44, 83, 13, 110, 133, 40, 132, 9, 211,
    223, 205, 244, 65, 129, 77, 82, 106, 220, 55, 200, 108, 193, 171, 250, 36, 225, 123, 8, 12,
    189, 177, 74, 120, 136, 149, 139, 227, 99, 232, 109, 233, 203, 213, 254, 59, 0, 29, 57, 242,
    239, 183, 14, 102, 88, 208, 228, 166, 119, 114, 248, 235, 117, 75, 10, 49, 68, 80, 180, 143,
    237, 31, 26, 219, 153, 141, 51, 159, 17, 131, 20,
];

/// MD2 hash context.
#[derive(Clone)]
pub struct Md2 {
    /// Digest state (16 bytes).
    state: [u8; 16],
    /// Running checksum over the message blocks.
    checksum: [u8; 16],
    /// Partial block buffer.
    buffer: [u8; MD2_BLOCK_SIZE],
    /// Number of bytes in the buffer.
    buffer_len: usize,
}

impl Md2 {
    /// Create a new MD2 hash context.
    pub fn new() -> Self {
        Self {
            state: [0; 16],
            checksum: [0; 16],
            buffer: [0; MD2_BLOCK_SIZE],
            buffer_len: 0,
        }
    }

    /// Feed data into the hash computation.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        let mut data = data;

        if self.buffer_len > 0 {
            let take = (MD2_BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];
            if self.buffer_len == MD2_BLOCK_SIZE {
                let block = self.buffer;
                self.compress(&block);
                self.buffer_len = 0;
            }
        }

        while data.len() >= MD2_BLOCK_SIZE {
            let (block, rest) = data.split_at(MD2_BLOCK_SIZE);
            let mut b = [0u8; MD2_BLOCK_SIZE];
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
    pub fn finish(&mut self) -> Result<[u8; MD2_OUTPUT_SIZE], CryptoError> {
        // Pad with i bytes of value i, where i brings the message to a
        // block boundary (a full block of 16s if already aligned)
        let pad_len = MD2_BLOCK_SIZE - self.buffer_len;
        let pad = [pad_len as u8; MD2_BLOCK_SIZE];
        self.update(&pad[..pad_len])?;

        // Append the checksum of the padded message
        let checksum = self.checksum;
        self.update(&checksum)?;

        Ok(self.state)
    }

    /// Reset the hash context for a new computation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One-shot: compute the MD2 digest of `data`.
    pub fn digest(data: &[u8]) -> Result<[u8; MD2_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }

    fn compress(&mut self, block: &[u8; MD2_BLOCK_SIZE]) {
        let mut x = [0u8; 48];
        x[..16].copy_from_slice(&self.state);
        x[16..32].copy_from_slice(block);
        for i in 0..16 {
            x[32 + i] = self.state[i] ^ block[i];
        }

        let mut t: u8 = 0;
        for round in 0..18u8 {
            for item in x.iter_mut() {
                *item ^= PI_SUBST[t as usize];
                t = *item;
            }
            t = t.wrapping_add(round);
        }
        self.state.copy_from_slice(&x[..16]);

        // Update the running checksum
        let mut l = self.checksum[15];
        for i in 0..16 {
            self.checksum[i] ^= PI_SUBST[(block[i] ^ l) as usize];
            l = self.checksum[i];
        }
    }
}

impl Digest for Md2 {
    fn output_size(&self) -> usize {
        MD2_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        MD2_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Md2::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < MD2_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: MD2_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Md2::finish(self)?;
        out[..MD2_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }

    fn reset(&mut self) {
        Md2::reset(self)
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

    // Test suite from RFC 1319 appendix A.5
    #[test]
    fn test_rfc1319_vectors() {
        let cases: &[(&[u8], &str)] = &[
            (b"", "8350e5a3e24c153df2275c9f80692773"),
            (b"a", "32ec01ec4a6dac72c0ab96fb34c0b5d1"),
            (b"abc", "da853b0d3f88d99b30283a69e6ded6bb"),
            (b"message digest", "ab4f496bfb2a530b219ff33031fe06b0"),
            (
                b"abcdefghijklmnopqrstuvwxyz",
                "4e8ddff3650292ab5a4108c3aa47940b",
            ),
        ];
        for (input, expected) in cases {
            let digest = Md2::digest(input).unwrap();
            assert_eq!(digest.to_vec(), hex(expected), "MD2({:?})", input);
        }
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data = b"message digest";
        let mut ctx = Md2::new();
        ctx.update(&data[..7]).unwrap();
        ctx.update(&data[7..]).unwrap();
        let incremental = ctx.finish().unwrap();
        assert_eq!(incremental, Md2::digest(data).unwrap());
    }

    #[test]
    fn test_reset() {
        let mut ctx = Md2::new();
        ctx.update(b"garbage").unwrap();
        ctx.reset();
        ctx.update(b"abc").unwrap();
        assert_eq!(ctx.finish().unwrap(), Md2::digest(b"abc").unwrap());
    }
}
