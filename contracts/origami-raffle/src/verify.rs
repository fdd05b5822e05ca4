use drand_verify::{derive_randomness, G2PubkeyRfc, Pubkey};
use thiserror::Error;

use crate::state::DrandConfig;

#[derive(Error, Debug, PartialEq)]
pub enum VerifyError {
    #[error("configured drand key is not a G2 point: {0}")]
    BadNetworkKey(String),

    #[error("malformed signature for round {round}: {msg}")]
    MalformedSignature { round: u64, msg: String },

    #[error("signature does not match round {round}")]
    SignatureMismatch { round: u64 },
}

/// Check a quicknet (unchained, G1 signatures) beacon against the configured
/// network key and return its randomness.
pub fn verify_beacon(
    drand: &DrandConfig,
    round: u64,
    signature: &[u8],
) -> Result<[u8; 32], VerifyError> {
    let network_key = G2PubkeyRfc::from_variable(&drand.pubkey)
        .map_err(|e| VerifyError::BadNetworkKey(e.to_string()))?;

    match network_key.verify(round, &[], signature) {
        Ok(true) => Ok(derive_randomness(signature)),
        Ok(false) => Err(VerifyError::SignatureMismatch { round }),
        Err(e) => Err(VerifyError::MalformedSignature {
            round,
            msg: e.to_string(),
        }),
    }
}

/// Unix time (seconds) at which `round` is published. Round 1 is emitted at genesis.
pub fn round_publish_time(drand: &DrandConfig, round: u64) -> u64 {
    drand
        .genesis_time
        .saturating_add(round.saturating_sub(1).saturating_mul(drand.period_seconds))
}
