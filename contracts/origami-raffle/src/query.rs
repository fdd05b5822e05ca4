use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult};
use cw_storage_plus::Bound;
use origami_common::{NftColor, RafflePhase};

use crate::execute::block_time;
use crate::msg::{
    HolderEntry, HolderTicketsResponse, HoldersResponse, NftOwnerEntry, NftOwnersResponse,
    ReassignmentHistoryResponse, ScheduleResponse,
};
use crate::state::{
    MainPayout, SaleState, CONFIG, HOLDERS, MAIN_PAYOUT, NFT_OWNERS, REASSIGNMENTS, SALE_STATE,
    SCHEDULE, TICKET_COUNTS, TREASURY,
};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_sale_state(deps: Deps) -> StdResult<Binary> {
    let sale = SALE_STATE.load(deps.storage)?;
    to_json_binary(&sale)
}

pub fn query_treasury(deps: Deps) -> StdResult<Binary> {
    let treasury = TREASURY.load(deps.storage)?;
    to_json_binary(&treasury)
}

/// Lifecycle phase at `env.block.time`.
pub fn raffle_phase(sale: &SaleState, payout: Option<&MainPayout>, env: &Env) -> RafflePhase {
    if sale.first_sale_at.is_none() {
        return RafflePhase::NotStarted;
    }
    if !sale.has_ended(block_time(env)) {
        return RafflePhase::Active;
    }
    match payout {
        Some(payout) if payout.is_settled() => RafflePhase::Settled,
        _ => RafflePhase::Ended,
    }
}

pub fn query_schedule(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let schedule = SCHEDULE.load(deps.storage)?;
    let payout = MAIN_PAYOUT.may_load(deps.storage)?;

    let phase = raffle_phase(&sale, payout.as_ref(), &env);

    // A slot at or past the end date is never served.
    let next_reassignment_at = match phase {
        RafflePhase::Active => schedule
            .next_reassignment_at
            .filter(|next| sale.end_at.map_or(true, |end| *next < end)),
        _ => None,
    };
    let next_small_distribution_at = if schedule.small_rounds_paid < config.small_prize_rounds {
        schedule
            .last_small_distribution_at
            .or(sale.first_sale_at)
            .map(|t| t.plus_seconds(config.small_prize_interval_seconds))
    } else {
        None
    };

    to_json_binary(&ScheduleResponse {
        phase,
        first_sale_at: sale.first_sale_at,
        end_at: sale.end_at,
        last_reassignment_at: schedule.last_reassignment_at,
        next_reassignment_at,
        reassignment_count: schedule.reassignment_count,
        last_drand_round: schedule.last_drand_round,
        next_small_distribution_at,
        small_rounds_paid: schedule.small_rounds_paid,
        small_rounds_total: config.small_prize_rounds,
    })
}

pub fn query_nft_owners(deps: Deps) -> StdResult<Binary> {
    let owners = NftColor::ALL
        .iter()
        .map(|color| -> StdResult<NftOwnerEntry> {
            Ok(NftOwnerEntry {
                color: *color,
                owner: NFT_OWNERS.may_load(deps.storage, color.storage_key())?,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&NftOwnersResponse { owners })
}

pub fn query_holders(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let holders: Vec<HolderEntry> = HOLDERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(ticket_id, holder)| HolderEntry { ticket_id, holder })
        .collect();

    to_json_binary(&HoldersResponse { holders })
}

pub fn query_holder_tickets(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let tickets = TICKET_COUNTS.may_load(deps.storage, &addr)?.unwrap_or(0);
    to_json_binary(&HolderTicketsResponse { address, tickets })
}

pub fn query_reassignment(deps: Deps, id: u64) -> StdResult<Binary> {
    let reassignment = REASSIGNMENTS.load(deps.storage, id)?;
    to_json_binary(&reassignment)
}

pub fn query_reassignment_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let reassignments: Vec<_> = REASSIGNMENTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, reassignment)| reassignment)
        .collect();

    to_json_binary(&ReassignmentHistoryResponse { reassignments })
}

pub fn query_main_payout(deps: Deps) -> StdResult<Binary> {
    let payout = MAIN_PAYOUT.may_load(deps.storage)?;
    to_json_binary(&payout)
}
