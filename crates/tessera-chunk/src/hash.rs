//! Integer hashes shared by the spatial index and deterministic worldgen.

#[inline]
pub fn hash_int(i: u32) -> u32 {
    let i = i.wrapping_mul(3_551_332_717);
    i ^ (i >> 15 | i << 17)
}

#[inline]
pub fn hash_int3(x: i32, y: i32, z: i32) -> u32 {
    let m: u32 = 3_757_705_307;
    let mut h: u32 = 4_075_758_091;
    h = (hash_int(x as u32) ^ h).wrapping_mul(m);
    h = (hash_int(y as u32) ^ h).wrapping_mul(m);
    h = (hash_int(z as u32) ^ h).wrapping_mul(m);
    h
}

/// `hash_int3` folded to 16 bits; the bucket key of the chunk store.
#[inline]
pub fn chunk_hash(x: i32, y: i32, z: i32) -> u32 {
    let h = hash_int3(x, y, z);
    (h >> 16) ^ (h & 0xFFFF)
}

/// Mixes a 32-bit seed into a voxel hash.
#[inline]
pub fn hash_seeded(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    hash_int(hash_int3(x, y, z) ^ hash_int(seed))
}
