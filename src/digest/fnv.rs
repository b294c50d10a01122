//! FNV-1 / FNV-1a at 32, 64 and 128 bits. Sums are big-endian, same byte order as Go's `hash/fnv`.

use super::DigestInstance;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnvWidth {
    W32,
    W64,
    W128,
}

impl FnvWidth {
    fn offset_basis(self) -> u128 {
        match self {
            FnvWidth::W32 => 0x811c_9dc5,
            FnvWidth::W64 => 0xcbf2_9ce4_8422_2325,
            FnvWidth::W128 => 0x6c62_272e_07bb_0142_62b8_2175_6295_c58d,
        }
    }

    fn prime(self) -> u128 {
        match self {
            FnvWidth::W32 => 0x0100_0193,
            FnvWidth::W64 => 0x0000_0100_0000_01b3,
            FnvWidth::W128 => 0x0000_0000_0100_0000_0000_0000_0000_013b,
        }
    }

    fn bytes(self) -> usize {
        match self {
            FnvWidth::W32 => 4,
            FnvWidth::W64 => 8,
            FnvWidth::W128 => 16,
        }
    }

    fn mask(self) -> u128 {
        match self {
            FnvWidth::W128 => u128::MAX,
            w => (1u128 << (w.bytes() * 8)) - 1,
        }
    }
}

/// State is kept in a u128 for every width; products are truncated to the width after each step.
#[derive(Clone, Debug)]
pub struct Fnv {
    width: FnvWidth,
    /// FNV-1a (xor then multiply) when true, FNV-1 (multiply then xor) otherwise.
    alternate: bool,
    state: u128,
}

impl Fnv {
    pub fn new(width: FnvWidth, alternate: bool) -> Self {
        Self {
            width,
            alternate,
            state: width.offset_basis(),
        }
    }
}

impl DigestInstance for Fnv {
    fn reset(&mut self) {
        self.state = self.width.offset_basis();
    }

    fn write(&mut self, data: &[u8]) {
        let prime = self.width.prime();
        let mask = self.width.mask();
        let mut state = self.state;
        for &b in data {
            if self.alternate {
                state ^= u128::from(b);
                state = state.wrapping_mul(prime) & mask;
            } else {
                state = state.wrapping_mul(prime) & mask;
                state ^= u128::from(b);
            }
        }
        self.state = state;
    }

    fn sum(&self) -> Vec<u8> {
        let n = self.width.bytes();
        self.state.to_be_bytes()[16 - n..].to_vec()
    }

    fn size(&self) -> usize {
        self.width.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fnv_hex(width: FnvWidth, alternate: bool, data: &[u8]) -> String {
        let mut h = Fnv::new(width, alternate);
        h.write(data);
        hex::encode(h.sum())
    }

    #[test]
    fn test_empty_input_is_offset_basis() {
        assert_eq!(fnv_hex(FnvWidth::W32, false, b""), "811c9dc5");
        assert_eq!(fnv_hex(FnvWidth::W64, true, b""), "cbf29ce484222325");
        assert_eq!(
            fnv_hex(FnvWidth::W128, true, b""),
            "6c62272e07bb014262b821756295c58d"
        );
    }

    #[test]
    fn test_single_byte_vectors() {
        assert_eq!(fnv_hex(FnvWidth::W32, false, b"a"), "050c5d7e");
        assert_eq!(fnv_hex(FnvWidth::W32, true, b"a"), "e40c292c");
        assert_eq!(fnv_hex(FnvWidth::W64, false, b"a"), "af63bd4c8601b7be");
        assert_eq!(fnv_hex(FnvWidth::W64, true, b"a"), "af63dc4c8601ec8c");
    }

    #[test]
    fn test_chunked_writes_match_single_write() {
        let mut h = Fnv::new(FnvWidth::W128, false);
        h.write(b"hello ");
        h.write(b"world");
        assert_eq!(hex::encode(h.sum()), fnv_hex(FnvWidth::W128, false, b"hello world"));
    }
}
