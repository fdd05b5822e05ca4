use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use origami_common::{NftColor, PrizeSplit};

pub const CONFIG: Item<RaffleConfig> = Item::new("config");
pub const SALE_STATE: Item<SaleState> = Item::new("sale_state");
pub const TREASURY: Item<Treasury> = Item::new("treasury");
pub const SCHEDULE: Item<ScheduleState> = Item::new("schedule");
pub const MAIN_PAYOUT: Item<MainPayout> = Item::new("main_payout");

/// Append-only holder roster, keyed by ticket id (0..tickets_sold).
pub const HOLDERS: Map<u32, Addr> = Map::new("holders");
/// Tickets held per address; an address appears once in HOLDERS per ticket.
pub const TICKET_COUNTS: Map<&Addr, u32> = Map::new("ticket_counts");
/// Current owner of each colored NFT, keyed by `NftColor::storage_key`.
pub const NFT_OWNERS: Map<u8, Addr> = Map::new("nft_owners");
pub const REASSIGNMENTS: Map<u64, Reassignment> = Map::new("reassignments");

#[cw_serde]
pub struct RaffleConfig {
    pub admin: Addr,
    /// Native denom tickets are paid in and prizes are paid out in
    pub denom: String,
    pub max_tickets: u32,
    pub start_price: Uint128,
    /// Added to the ticket price after every sale
    pub price_increment: Uint128,
    /// Fixed amount of every payment kept as reserve
    pub reserve_per_ticket: Uint128,
    /// Share of (payment - reserve) that funds the small prize pool, in bps
    pub small_prize_bps: u16,
    pub main_prize_split: PrizeSplit,
    /// End date offset from the first ticket sale
    pub campaign_duration_seconds: u64,
    pub reassignment_interval_seconds: u64,
    pub small_prize_interval_seconds: u64,
    pub small_prize_rounds: u32,
    /// 1 pays the main prize in one lump sum
    pub vesting_installments: u32,
    pub vesting_interval_seconds: u64,
    pub drand: DrandConfig,
}

#[cw_serde]
pub struct DrandConfig {
    /// Quicknet public key, 96 bytes (G2 point)
    pub pubkey: Vec<u8>,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between rounds in seconds (3 for quicknet)
    pub period_seconds: u64,
}

#[cw_serde]
pub struct SaleState {
    pub tickets_sold: u32,
    pub current_price: Uint128,
    pub first_sale_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
}

impl SaleState {
    /// Sales and reassignments stop at `end_at`.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        matches!(self.end_at, Some(end) if now >= end)
    }
}

#[cw_serde]
pub struct Treasury {
    /// Sum of every ticket payment ever received
    pub total_collected: Uint128,
    pub reserve_balance: Uint128,
    pub reserve_withdrawn: Uint128,
    pub small_prize_pool: Uint128,
    pub small_prizes_paid: Uint128,
    pub main_prize_pool: Uint128,
    pub main_prizes_paid: Uint128,
}

impl Treasury {
    pub fn new() -> Self {
        Treasury {
            total_collected: Uint128::zero(),
            reserve_balance: Uint128::zero(),
            reserve_withdrawn: Uint128::zero(),
            small_prize_pool: Uint128::zero(),
            small_prizes_paid: Uint128::zero(),
            main_prize_pool: Uint128::zero(),
            main_prizes_paid: Uint128::zero(),
        }
    }

    /// Everything collected, wherever it sits now. Always equals `total_collected`.
    pub fn accounted(&self) -> Uint128 {
        self.reserve_balance
            + self.reserve_withdrawn
            + self.small_prize_pool
            + self.small_prizes_paid
            + self.main_prize_pool
            + self.main_prizes_paid
    }
}

impl Default for Treasury {
    fn default() -> Self {
        Self::new()
    }
}

#[cw_serde]
pub struct ScheduleState {
    pub last_reassignment_at: Option<Timestamp>,
    /// Earliest time the keeper may rotate the NFTs again
    pub next_reassignment_at: Option<Timestamp>,
    pub last_drand_round: u64,
    pub reassignment_count: u64,
    pub last_small_distribution_at: Option<Timestamp>,
    pub small_rounds_paid: u32,
}

#[cw_serde]
pub struct ColorDraw {
    pub color: NftColor,
    /// Index into the holder roster the draw landed on
    pub index: u32,
    pub previous_owner: Addr,
    pub new_owner: Addr,
}

#[cw_serde]
pub struct Reassignment {
    pub id: u64,
    pub drand_round: u64,
    pub roster_size: u32,
    pub draws: Vec<ColorDraw>,
    pub executed_at: Timestamp,
}

#[cw_serde]
pub struct PrizeRecipient {
    pub color: NftColor,
    pub owner: Addr,
    pub share: Uint128,
    pub paid: Uint128,
}

/// Main prize payout, frozen by the first distribution after the end date.
#[cw_serde]
pub struct MainPayout {
    pub total: Uint128,
    pub starts_at: Timestamp,
    pub installments: u32,
    pub installments_paid: u32,
    pub recipients: Vec<PrizeRecipient>,
}

impl MainPayout {
    pub fn is_settled(&self) -> bool {
        self.installments_paid >= self.installments
    }
}
