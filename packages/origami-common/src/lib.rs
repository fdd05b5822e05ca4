pub mod random;
pub mod types;

pub use random::{BeaconRng, RandomSource};
pub use types::{NftColor, PrizeSplit, RafflePhase};
