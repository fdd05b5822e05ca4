use sha2::{Digest, Sha256};

/// Source of uniform draws used to reassign NFTs.
///
/// The contract never seeds or owns randomness itself: in production the
/// stream comes from a verified drand beacon, in tests from a fixed script.
pub trait RandomSource {
    /// Uniform index in `[0, bound)`, or `None` when `bound` is zero.
    fn next_index(&mut self, bound: u32) -> Option<u32>;
}

/// Deterministic draw stream expanded from a 32-byte beacon seed.
///
/// Draw `n` is `uint128(sha256(seed || n_be)[0..16]) % bound`. Every call
/// advances the counter, so successive draws are independent of each other.
pub struct BeaconRng {
    seed: [u8; 32],
    counter: u64,
}

impl BeaconRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed, counter: 0 }
    }
}

impl RandomSource for BeaconRng {
    fn next_index(&mut self, bound: u32) -> Option<u32> {
        if bound == 0 {
            return None;
        }

        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        self.counter += 1;

        let mut raw_bytes = [0u8; 16];
        raw_bytes.copy_from_slice(&digest[0..16]);
        let raw = u128::from_be_bytes(raw_bytes);
        Some((raw % bound as u128) as u32)
    }
}
