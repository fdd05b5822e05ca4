use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};
use origami_common::{NftColor, PrizeSplit, RafflePhase};

use crate::state::{MainPayout, RaffleConfig, Reassignment, SaleState, Treasury};

#[cw_serde]
pub struct InstantiateMsg {
    pub denom: String,
    pub max_tickets: u32,
    pub start_price: Uint128,
    pub price_increment: Uint128,
    pub reserve_per_ticket: Uint128,
    pub small_prize_bps: u16,
    pub main_prize_split: PrizeSplit,
    pub campaign_duration_seconds: u64,
    pub reassignment_interval_seconds: u64,
    pub small_prize_interval_seconds: u64,
    pub small_prize_rounds: u32,
    pub vesting_installments: u32,
    pub vesting_interval_seconds: u64,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub drand_pubkey_hex: String,
    pub drand_genesis_time: u64,
    pub drand_period_seconds: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Buy one ticket at the current price. Send the payment in info.funds.
    BuyTicket {},
    /// Rotate the three NFTs to random holders. Anyone can call once the
    /// next slot is due, with a drand beacon published after that slot opened.
    TransferNfts {
        drand_round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Pay out every main prize installment due. Anyone can call after the end date.
    DistributeMainPrizes {},
    /// Pay out the next small prize round. Anyone can call once due.
    DistributeSmallPrizes {},
    /// Withdraw from the reserve. Admin only.
    WithdrawReserve {
        /// Defaults to the whole reserve balance
        amount: Option<Uint128>,
        /// Defaults to the admin
        recipient: Option<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RaffleConfig)]
    Config {},
    #[returns(SaleState)]
    SaleState {},
    #[returns(Treasury)]
    Treasury {},
    #[returns(ScheduleResponse)]
    Schedule {},
    #[returns(NftOwnersResponse)]
    NftOwners {},
    #[returns(HoldersResponse)]
    Holders {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(HolderTicketsResponse)]
    HolderTickets { address: String },
    #[returns(Reassignment)]
    Reassignment { id: u64 },
    #[returns(ReassignmentHistoryResponse)]
    ReassignmentHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Option<MainPayout>)]
    MainPayout {},
}

#[cw_serde]
pub struct ScheduleResponse {
    pub phase: RafflePhase,
    pub first_sale_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub last_reassignment_at: Option<Timestamp>,
    pub next_reassignment_at: Option<Timestamp>,
    pub reassignment_count: u64,
    pub last_drand_round: u64,
    pub next_small_distribution_at: Option<Timestamp>,
    pub small_rounds_paid: u32,
    pub small_rounds_total: u32,
}

#[cw_serde]
pub struct NftOwnerEntry {
    pub color: NftColor,
    pub owner: Option<Addr>,
}

#[cw_serde]
pub struct NftOwnersResponse {
    pub owners: Vec<NftOwnerEntry>,
}

#[cw_serde]
pub struct HolderEntry {
    pub ticket_id: u32,
    pub holder: Addr,
}

#[cw_serde]
pub struct HoldersResponse {
    pub holders: Vec<HolderEntry>,
}

#[cw_serde]
pub struct HolderTicketsResponse {
    pub address: String,
    pub tickets: u32,
}

#[cw_serde]
pub struct ReassignmentHistoryResponse {
    pub reassignments: Vec<Reassignment>,
}
