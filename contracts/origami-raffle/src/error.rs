use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid basis points: {field} = {value} (must be <= 10000)")]
    InvalidBps { field: String, value: u16 },

    #[error("prize split doesn't sum to 10000: red({red}) + green({green}) + blue({blue}) = {total}")]
    BpsSumMismatch {
        red: u16,
        green: u16,
        blue: u16,
        total: u32,
    },

    #[error("reserve per ticket {reserve} exceeds start price {start_price}")]
    ReserveExceedsPrice {
        reserve: Uint128,
        start_price: Uint128,
    },

    #[error("invalid hex: {field}")]
    InvalidHex { field: String },

    #[error("invalid drand pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("no funds sent with ticket purchase")]
    NoFundsSent,

    #[error("must send exactly one coin")]
    InvalidFunds,

    #[error("must send {expected} denom, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("ticket sale closed at {end_at}")]
    SaleClosed { end_at: u64 },

    #[error("all {max_tickets} tickets sold")]
    SoldOut { max_tickets: u32 },

    #[error("payment {sent} below current ticket price {price}")]
    Underpaid { price: Uint128, sent: Uint128 },

    #[error("no ticket holders yet")]
    NoHolders,

    #[error("campaign ended at {end_at}; NFTs no longer rotate")]
    CampaignEnded { end_at: u64 },

    #[error("next reassignment not due until {next_at}")]
    ReassignmentNotDue { next_at: u64 },

    #[error("drand round {round} already used or older (last used: {last_round})")]
    StaleBeacon { round: u64, last_round: u64 },

    #[error("drand round {round} was published at {published_at}, before the slot opened at {due_at}")]
    BeaconTooOld {
        round: u64,
        published_at: u64,
        due_at: u64,
    },

    #[error("beacon verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("main prizes can't be distributed before {end_at}")]
    DistributionTooEarly { end_at: u64 },

    #[error("no main prize installment due until {next_at}")]
    NoInstallmentDue { next_at: u64 },

    #[error("main prize already fully distributed")]
    MainPrizeSettled,

    #[error("next small prize round not due until {next_at}")]
    SmallPrizeTooEarly { next_at: u64 },

    #[error("all {rounds} small prize rounds already paid")]
    SmallPrizesExhausted { rounds: u32 },

    #[error("{pool} pool is empty")]
    EmptyPool { pool: String },

    #[error("insufficient reserve: need {needed}, have {available}")]
    InsufficientReserve {
        needed: Uint128,
        available: Uint128,
    },

    #[error("NFT owner missing for {color}")]
    NftNotMinted { color: String },
}
