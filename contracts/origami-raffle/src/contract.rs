#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{
    SaleState, ScheduleState, Treasury, CONFIG, SALE_STATE, SCHEDULE, TREASURY,
};

const CONTRACT_NAME: &str = "crates.io:origami-raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = execute::build_config(info.sender.clone(), msg)?;
    CONFIG.save(deps.storage, &config)?;

    SALE_STATE.save(
        deps.storage,
        &SaleState {
            tickets_sold: 0,
            current_price: config.start_price,
            first_sale_at: None,
            end_at: None,
        },
    )?;
    TREASURY.save(deps.storage, &Treasury::new())?;
    SCHEDULE.save(
        deps.storage,
        &ScheduleState {
            last_reassignment_at: None,
            next_reassignment_at: None,
            last_drand_round: 0,
            reassignment_count: 0,
            last_small_distribution_at: None,
            small_rounds_paid: 0,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "origami-raffle")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("max_tickets", config.max_tickets.to_string())
        .add_attribute("start_price", config.start_price.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::BuyTicket {} => execute::buy_ticket(deps, env, info),
        ExecuteMsg::TransferNfts {
            drand_round,
            signature_hex,
        } => execute::transfer_nfts(deps, env, info, drand_round, signature_hex),
        ExecuteMsg::DistributeMainPrizes {} => execute::distribute_main_prizes(deps, env, info),
        ExecuteMsg::DistributeSmallPrizes {} => execute::distribute_small_prizes(deps, env, info),
        ExecuteMsg::WithdrawReserve { amount, recipient } => {
            execute::withdraw_reserve(deps, env, info, amount, recipient)
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::SaleState {} => query::query_sale_state(deps),
        QueryMsg::Treasury {} => query::query_treasury(deps),
        QueryMsg::Schedule {} => query::query_schedule(deps, env),
        QueryMsg::NftOwners {} => query::query_nft_owners(deps),
        QueryMsg::Holders { start_after, limit } => {
            query::query_holders(deps, start_after, limit)
        }
        QueryMsg::HolderTickets { address } => query::query_holder_tickets(deps, address),
        QueryMsg::Reassignment { id } => query::query_reassignment(deps, id),
        QueryMsg::ReassignmentHistory { start_after, limit } => {
            query::query_reassignment_history(deps, start_after, limit)
        }
        QueryMsg::MainPayout {} => query::query_main_payout(deps),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
