//! Seed derivation: a seed string is hashed and expanded into independent
//! per-field seeds with a PCG32 stream.

/// FNV-1a over the UTF-8 bytes of `s`.
pub fn hash_string(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// Minimal PCG-XSH-RR 64/32 generator.
#[derive(Clone, Debug)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Pcg32 {
    const MULT: u64 = 6_364_136_223_846_793_005;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: 0,
            inc: (0xda3e_39cb_94b9_5bdb << 1) | 1,
        };
        rng.next_u32();
        rng.state = rng.state.wrapping_add(seed);
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(Self::MULT).wrapping_add(self.inc);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

/// Per-field seeds derived from the world seed string.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WorldSeeds {
    pub heightmap: u32,
    pub density: u32,
    pub decoration: u32,
}

impl WorldSeeds {
    pub fn from_seed(seed: &str) -> Self {
        let mut rng = Pcg32::new(hash_string(seed));
        Self {
            heightmap: rng.next_u32(),
            density: rng.next_u32(),
            decoration: rng.next_u32(),
        }
    }
}
