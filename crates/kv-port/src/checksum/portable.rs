//! Table-driven CRC32C, used when no accelerated implementation is linked.

use super::ChecksumProvider;

/// Reflected Castagnoli polynomial.
const POLYNOMIAL: u32 = 0x82f6_3b78;

/// Slicing-by-4 lookup tables.
static TABLES: [[u32; 256]; 4] = build_tables();

const fn build_tables() -> [[u32; 256]; 4] {
    let mut tables = [[0u32; 256]; 4];

    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut i = 0;
    while i < 256 {
        let mut t = 1;
        while t < 4 {
            let prev = tables[t - 1][i];
            tables[t][i] = (prev >> 8) ^ tables[0][(prev & 0xff) as usize];
            t += 1;
        }
        i += 1;
    }

    tables
}

/// Software CRC32C. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableCrc32c;

impl ChecksumProvider for PortableCrc32c {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn extend(&self, crc: u32, data: &[u8]) -> u32 {
        let mut l = !crc;

        let mut words = data.chunks_exact(4);
        for word in &mut words {
            l ^= u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            l = TABLES[3][(l & 0xff) as usize]
                ^ TABLES[2][((l >> 8) & 0xff) as usize]
                ^ TABLES[1][((l >> 16) & 0xff) as usize]
                ^ TABLES[0][(l >> 24) as usize];
        }

        for byte in words.remainder() {
            l = TABLES[0][((l ^ u32::from(*byte)) & 0xff) as usize] ^ (l >> 8);
        }

        !l
    }
}
