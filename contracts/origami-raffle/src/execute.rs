use cosmwasm_std::{
    coins, Addr, BankMsg, DepsMut, Env, Event, MessageInfo, Response, Timestamp, Uint128,
};
use origami_common::{BeaconRng, NftColor, RandomSource};

use crate::error::ContractError;
use crate::msg::InstantiateMsg;
use crate::state::{
    ColorDraw, DrandConfig, MainPayout, PrizeRecipient, RaffleConfig, Reassignment, CONFIG,
    HOLDERS, MAIN_PAYOUT, NFT_OWNERS, REASSIGNMENTS, SALE_STATE, SCHEDULE, TICKET_COUNTS,
    TREASURY,
};
use crate::treasury::{
    installment_time, installments_due, main_prize_shares, split_evenly, split_payment,
    vested_amount,
};
use crate::verify::{round_publish_time, verify_beacon};

const DRAND_PUBKEY_LEN: usize = 96;

/// Block time truncated to whole seconds. Every stored time and every
/// comparison uses this, so a reported deadline is exactly when a retry passes.
pub fn block_time(env: &Env) -> Timestamp {
    Timestamp::from_seconds(env.block.time.seconds())
}

/// Validate an instantiate message into the stored config.
pub fn build_config(admin: Addr, msg: InstantiateMsg) -> Result<RaffleConfig, ContractError> {
    if msg.denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom must not be empty".to_string(),
        });
    }
    if msg.max_tickets == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max_tickets must be positive".to_string(),
        });
    }
    if msg.reserve_per_ticket > msg.start_price {
        return Err(ContractError::ReserveExceedsPrice {
            reserve: msg.reserve_per_ticket,
            start_price: msg.start_price,
        });
    }
    if msg.small_prize_bps > 10000 {
        return Err(ContractError::InvalidBps {
            field: "small_prize_bps".to_string(),
            value: msg.small_prize_bps,
        });
    }

    let split = &msg.main_prize_split;
    if split.total() != 10000 {
        return Err(ContractError::BpsSumMismatch {
            red: split.red_bps,
            green: split.green_bps,
            blue: split.blue_bps,
            total: split.total(),
        });
    }

    for (field, value) in [
        ("campaign_duration_seconds", msg.campaign_duration_seconds),
        ("reassignment_interval_seconds", msg.reassignment_interval_seconds),
        ("small_prize_interval_seconds", msg.small_prize_interval_seconds),
        ("vesting_interval_seconds", msg.vesting_interval_seconds),
        ("drand_period_seconds", msg.drand_period_seconds),
    ] {
        if value == 0 {
            return Err(ContractError::InvalidConfig {
                reason: format!("{} must be positive", field),
            });
        }
    }
    if msg.small_prize_rounds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "small_prize_rounds must be positive".to_string(),
        });
    }
    if msg.vesting_installments == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "vesting_installments must be positive".to_string(),
        });
    }

    let pubkey = hex::decode(&msg.drand_pubkey_hex).map_err(|_| ContractError::InvalidHex {
        field: "drand_pubkey_hex".to_string(),
    })?;
    if pubkey.len() != DRAND_PUBKEY_LEN {
        return Err(ContractError::InvalidPubkeyLength { got: pubkey.len() });
    }

    Ok(RaffleConfig {
        admin,
        denom: msg.denom,
        max_tickets: msg.max_tickets,
        start_price: msg.start_price,
        price_increment: msg.price_increment,
        reserve_per_ticket: msg.reserve_per_ticket,
        small_prize_bps: msg.small_prize_bps,
        main_prize_split: msg.main_prize_split,
        campaign_duration_seconds: msg.campaign_duration_seconds,
        reassignment_interval_seconds: msg.reassignment_interval_seconds,
        small_prize_interval_seconds: msg.small_prize_interval_seconds,
        small_prize_rounds: msg.small_prize_rounds,
        vesting_installments: msg.vesting_installments,
        vesting_interval_seconds: msg.vesting_interval_seconds,
        drand: DrandConfig {
            pubkey,
            genesis_time: msg.drand_genesis_time,
            period_seconds: msg.drand_period_seconds,
        },
    })
}

/// Buy one ticket at the current price.
///
/// The whole payment is split into reserve, small prize and main prize, so
/// overpaying tops up the pools rather than being refunded. The first sale
/// starts the campaign clock and mints all three NFTs to the buyer.
pub fn buy_ticket(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = block_time(&env);

    // Validate funds: exactly one coin, in the raffle denom
    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds);
    }
    let sent = &info.funds[0];
    if sent.denom != config.denom {
        return Err(ContractError::WrongDenom {
            expected: config.denom.clone(),
            denom: sent.denom.clone(),
        });
    }
    let payment = sent.amount;
    if payment.is_zero() {
        return Err(ContractError::NoFundsSent);
    }

    let mut sale = SALE_STATE.load(deps.storage)?;

    if sale.has_ended(now) {
        return Err(ContractError::SaleClosed {
            end_at: sale.end_at.map_or(0, |end| end.seconds()),
        });
    }
    if sale.tickets_sold >= config.max_tickets {
        return Err(ContractError::SoldOut {
            max_tickets: config.max_tickets,
        });
    }
    if payment < sale.current_price {
        return Err(ContractError::Underpaid {
            price: sale.current_price,
            sent: payment,
        });
    }

    let split = split_payment(payment, config.reserve_per_ticket, config.small_prize_bps)?;

    let ticket_id = sale.tickets_sold;
    HOLDERS.save(deps.storage, ticket_id, &info.sender)?;
    let held = TICKET_COUNTS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or(0);
    TICKET_COUNTS.save(deps.storage, &info.sender, &(held + 1))?;

    let mut treasury = TREASURY.load(deps.storage)?;
    treasury.total_collected += payment;
    treasury.reserve_balance += split.reserve;
    treasury.small_prize_pool += split.small_prize;
    treasury.main_prize_pool += split.main_prize;
    TREASURY.save(deps.storage, &treasury)?;

    let price_paid = sale.current_price;
    sale.tickets_sold += 1;
    sale.current_price = sale.current_price.checked_add(config.price_increment)?;

    let mut response = Response::new();

    if sale.first_sale_at.is_none() {
        let end_at = now.plus_seconds(config.campaign_duration_seconds);
        sale.first_sale_at = Some(now);
        sale.end_at = Some(end_at);

        // The first rotation waits a full interval, like every later one
        let mut schedule = SCHEDULE.load(deps.storage)?;
        schedule.next_reassignment_at =
            Some(now.plus_seconds(config.reassignment_interval_seconds));
        SCHEDULE.save(deps.storage, &schedule)?;

        for color in NftColor::ALL {
            NFT_OWNERS.save(deps.storage, color.storage_key(), &info.sender)?;
            response = response.add_event(
                Event::new("origami_nft_minted")
                    .add_attribute("color", color.as_str())
                    .add_attribute("owner", info.sender.to_string()),
            );
        }
    }
    SALE_STATE.save(deps.storage, &sale)?;

    Ok(response
        .add_attribute("action", "buy_ticket")
        .add_attribute("buyer", info.sender.to_string())
        .add_attribute("ticket_id", ticket_id.to_string())
        .add_attribute("payment", payment.to_string())
        .add_event(
            Event::new("origami_ticket_purchased")
                .add_attribute("buyer", info.sender.to_string())
                .add_attribute("ticket_id", ticket_id.to_string())
                .add_attribute("price", price_paid.to_string())
                .add_attribute("payment", payment.to_string())
                .add_attribute("reserve", split.reserve.to_string())
                .add_attribute("small_prize", split.small_prize.to_string())
                .add_attribute("main_prize", split.main_prize.to_string())
                .add_attribute("next_price", sale.current_price.to_string())
                .add_attribute("tickets_sold", sale.tickets_sold.to_string())
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// Rotate the NFTs using a drand beacon. Anyone can call.
///
/// 1. The round must be newer than the last one used
/// 2. The round must have been published after the slot opened, so the
///    caller can't pick among beacons known in advance
/// 3. The BLS signature must verify against the configured key
/// 4. sha256(signature) seeds the draws
pub fn transfer_nfts(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    drand_round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let schedule = SCHEDULE.load(deps.storage)?;

    if sale.first_sale_at.is_none() {
        return Err(ContractError::NoHolders);
    }

    if drand_round <= schedule.last_drand_round {
        return Err(ContractError::StaleBeacon {
            round: drand_round,
            last_round: schedule.last_drand_round,
        });
    }

    let due_at = schedule
        .next_reassignment_at
        .ok_or(ContractError::NoHolders)?;
    let published_at = round_publish_time(&config.drand, drand_round);
    if published_at < due_at.seconds() {
        return Err(ContractError::BeaconTooOld {
            round: drand_round,
            published_at,
            due_at: due_at.seconds(),
        });
    }

    let signature = hex::decode(&signature_hex).map_err(|_| ContractError::InvalidHex {
        field: "signature_hex".to_string(),
    })?;
    let randomness = verify_beacon(&config.drand, drand_round, &signature).map_err(|e| {
        ContractError::VerificationFailed {
            reason: e.to_string(),
        }
    })?;

    let mut rng = BeaconRng::new(randomness);
    let response = reassign_nfts(deps, &env, drand_round, &mut rng)?;

    Ok(response
        .add_attribute("keeper", info.sender.to_string())
        .add_attribute("randomness", hex::encode(randomness)))
}

/// Draw a new owner for each NFT from the holder roster and arm the next slot.
///
/// Each colour gets its own draw, so one holder may end up with several NFTs
/// and an NFT may stay with its current owner.
pub fn reassign_nfts<R: RandomSource>(
    deps: DepsMut,
    env: &Env,
    drand_round: u64,
    rng: &mut R,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let now = block_time(env);

    if sale.tickets_sold == 0 {
        return Err(ContractError::NoHolders);
    }
    if sale.has_ended(now) {
        return Err(ContractError::CampaignEnded {
            end_at: sale.end_at.map_or(0, |end| end.seconds()),
        });
    }

    let mut schedule = SCHEDULE.load(deps.storage)?;
    let next_at = schedule
        .next_reassignment_at
        .ok_or(ContractError::NoHolders)?;
    if now < next_at {
        return Err(ContractError::ReassignmentNotDue {
            next_at: next_at.seconds(),
        });
    }

    let mut draws = Vec::with_capacity(NftColor::ALL.len());
    let mut event = Event::new("origami_nfts_reassigned");

    for color in NftColor::ALL {
        let index = rng
            .next_index(sale.tickets_sold)
            .ok_or(ContractError::NoHolders)?;
        let new_owner = HOLDERS.load(deps.storage, index)?;
        let previous_owner = NFT_OWNERS
            .may_load(deps.storage, color.storage_key())?
            .ok_or(ContractError::NftNotMinted {
                color: color.as_str().to_string(),
            })?;
        NFT_OWNERS.save(deps.storage, color.storage_key(), &new_owner)?;

        event = event
            .add_attribute(format!("{}_index", color.as_str()), index.to_string())
            .add_attribute(format!("{}_owner", color.as_str()), new_owner.to_string());

        draws.push(ColorDraw {
            color,
            index,
            previous_owner,
            new_owner,
        });
    }

    let id = schedule.reassignment_count;
    let next_at = now.plus_seconds(config.reassignment_interval_seconds);
    schedule.last_reassignment_at = Some(now);
    schedule.next_reassignment_at = Some(next_at);
    schedule.last_drand_round = drand_round;
    schedule.reassignment_count += 1;
    SCHEDULE.save(deps.storage, &schedule)?;

    REASSIGNMENTS.save(
        deps.storage,
        id,
        &Reassignment {
            id,
            drand_round,
            roster_size: sale.tickets_sold,
            draws,
            executed_at: now,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "transfer_nfts")
        .add_attribute("reassignment_id", id.to_string())
        .add_attribute("drand_round", drand_round.to_string())
        .add_event(
            event
                .add_attribute("reassignment_id", id.to_string())
                .add_attribute("drand_round", drand_round.to_string())
                .add_attribute("roster_size", sale.tickets_sold.to_string())
                .add_attribute("next_reassignment_at", next_at.seconds().to_string())
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// Pay the main prize to the NFT holders. Anyone can call after the end date.
///
/// The first call freezes the payout: the pool total, the per-colour shares
/// and the recipients. Each call then pays every installment due and not yet
/// paid, and a call with nothing due is rejected, so nothing is paid twice.
pub fn distribute_main_prizes(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let now = block_time(&env);

    let end_at = sale.end_at.ok_or(ContractError::NoHolders)?;
    if now < end_at {
        return Err(ContractError::DistributionTooEarly {
            end_at: end_at.seconds(),
        });
    }

    let mut treasury = TREASURY.load(deps.storage)?;

    let mut payout = match MAIN_PAYOUT.may_load(deps.storage)? {
        Some(payout) => payout,
        None if treasury.main_prize_pool.is_zero() => {
            return settle_empty_main_payout(deps, &config, end_at, now);
        }
        None => {
            let mut recipients = Vec::with_capacity(NftColor::ALL.len());
            for (color, share) in
                main_prize_shares(treasury.main_prize_pool, &config.main_prize_split)
            {
                let owner = NFT_OWNERS
                    .may_load(deps.storage, color.storage_key())?
                    .ok_or(ContractError::NftNotMinted {
                        color: color.as_str().to_string(),
                    })?;
                recipients.push(PrizeRecipient {
                    color,
                    owner,
                    share,
                    paid: Uint128::zero(),
                });
            }

            MainPayout {
                total: treasury.main_prize_pool,
                starts_at: end_at,
                installments: config.vesting_installments,
                installments_paid: 0,
                recipients,
            }
        }
    };

    if payout.is_settled() {
        return Err(ContractError::MainPrizeSettled);
    }

    let due = installments_due(
        payout.starts_at,
        config.vesting_interval_seconds,
        payout.installments,
        now,
    );
    if due <= payout.installments_paid {
        let next_at = installment_time(
            payout.starts_at,
            config.vesting_interval_seconds,
            payout.installments_paid,
        );
        return Err(ContractError::NoInstallmentDue {
            next_at: next_at.seconds(),
        });
    }

    let mut response = Response::new();
    let mut event = Event::new("origami_main_prizes_distributed");
    let mut total_paid = Uint128::zero();

    for recipient in payout.recipients.iter_mut() {
        let vested = vested_amount(recipient.share, due, payout.installments);
        let amount = vested.checked_sub(recipient.paid)?;
        recipient.paid = vested;
        total_paid += amount;

        if !amount.is_zero() {
            response = response.add_message(BankMsg::Send {
                to_address: recipient.owner.to_string(),
                amount: coins(amount.u128(), &config.denom),
            });
        }
        event = event
            .add_attribute(
                format!("{}_winner", recipient.color.as_str()),
                recipient.owner.to_string(),
            )
            .add_attribute(format!("{}_amount", recipient.color.as_str()), amount.to_string());
    }

    let first_installment = payout.installments_paid;
    payout.installments_paid = due;
    MAIN_PAYOUT.save(deps.storage, &payout)?;

    treasury.main_prize_pool = treasury.main_prize_pool.checked_sub(total_paid)?;
    treasury.main_prizes_paid += total_paid;
    TREASURY.save(deps.storage, &treasury)?;

    Ok(response
        .add_attribute("action", "distribute_main_prizes")
        .add_attribute("amount", total_paid.to_string())
        .add_attribute("installments_paid", due.to_string())
        .add_event(
            event
                .add_attribute("amount", total_paid.to_string())
                .add_attribute("denom", config.denom)
                .add_attribute("from_installment", first_installment.to_string())
                .add_attribute("installments_paid", due.to_string())
                .add_attribute("installments", payout.installments.to_string())
                .add_attribute("remaining_pool", treasury.main_prize_pool.to_string())
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// A campaign whose main pool ended empty is settled with nothing to pay.
fn settle_empty_main_payout(
    deps: DepsMut,
    config: &RaffleConfig,
    end_at: Timestamp,
    now: Timestamp,
) -> Result<Response, ContractError> {
    MAIN_PAYOUT.save(
        deps.storage,
        &MainPayout {
            total: Uint128::zero(),
            starts_at: end_at,
            installments: config.vesting_installments,
            installments_paid: config.vesting_installments,
            recipients: vec![],
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "distribute_main_prizes")
        .add_attribute("amount", "0")
        .add_attribute("installments_paid", config.vesting_installments.to_string())
        .add_event(
            Event::new("origami_main_prizes_distributed")
                .add_attribute("amount", "0")
                .add_attribute("denom", config.denom.clone())
                .add_attribute("installments_paid", config.vesting_installments.to_string())
                .add_attribute("installments", config.vesting_installments.to_string())
                .add_attribute("remaining_pool", "0")
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// Pay one round of small prizes, split evenly across the NFT holders.
/// Anyone can call once the round interval has elapsed.
///
/// Each round pays `pool / rounds_left`, so the last round drains the pool.
pub fn distribute_small_prizes(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let first_sale_at = sale.first_sale_at.ok_or(ContractError::NoHolders)?;
    let now = block_time(&env);

    let mut schedule = SCHEDULE.load(deps.storage)?;
    if schedule.small_rounds_paid >= config.small_prize_rounds {
        return Err(ContractError::SmallPrizesExhausted {
            rounds: config.small_prize_rounds,
        });
    }

    let next_at = schedule
        .last_small_distribution_at
        .unwrap_or(first_sale_at)
        .plus_seconds(config.small_prize_interval_seconds);
    if now < next_at {
        return Err(ContractError::SmallPrizeTooEarly {
            next_at: next_at.seconds(),
        });
    }

    let mut treasury = TREASURY.load(deps.storage)?;
    let rounds_left = config.small_prize_rounds - schedule.small_rounds_paid;
    let tranche = treasury.small_prize_pool / Uint128::from(rounds_left as u128);

    let mut response = Response::new();
    let mut event = Event::new("origami_small_prizes_distributed");

    for (color, amount) in split_evenly(tranche) {
        let owner = NFT_OWNERS
            .may_load(deps.storage, color.storage_key())?
            .ok_or(ContractError::NftNotMinted {
                color: color.as_str().to_string(),
            })?;
        if !amount.is_zero() {
            response = response.add_message(BankMsg::Send {
                to_address: owner.to_string(),
                amount: coins(amount.u128(), &config.denom),
            });
        }
        event = event
            .add_attribute(format!("{}_winner", color.as_str()), owner.to_string())
            .add_attribute(format!("{}_amount", color.as_str()), amount.to_string());
    }

    treasury.small_prize_pool = treasury.small_prize_pool.checked_sub(tranche)?;
    treasury.small_prizes_paid += tranche;
    TREASURY.save(deps.storage, &treasury)?;

    schedule.last_small_distribution_at = Some(now);
    schedule.small_rounds_paid += 1;
    SCHEDULE.save(deps.storage, &schedule)?;

    Ok(response
        .add_attribute("action", "distribute_small_prizes")
        .add_attribute("round", schedule.small_rounds_paid.to_string())
        .add_attribute("amount", tranche.to_string())
        .add_event(
            event
                .add_attribute("round", schedule.small_rounds_paid.to_string())
                .add_attribute("rounds_total", config.small_prize_rounds.to_string())
                .add_attribute("amount", tranche.to_string())
                .add_attribute("remaining_pool", treasury.small_prize_pool.to_string())
                .add_attribute("timestamp", now.seconds().to_string()),
        ))
}

/// Withdraw from the reserve. Admin only.
pub fn withdraw_reserve(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Option<Uint128>,
    recipient: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can withdraw the reserve".to_string(),
        });
    }

    let mut treasury = TREASURY.load(deps.storage)?;
    let amount = amount.unwrap_or(treasury.reserve_balance);
    if amount.is_zero() {
        return Err(ContractError::EmptyPool {
            pool: "reserve".to_string(),
        });
    }
    if amount > treasury.reserve_balance {
        return Err(ContractError::InsufficientReserve {
            needed: amount,
            available: treasury.reserve_balance,
        });
    }

    let recipient = match recipient {
        Some(addr) => deps.api.addr_validate(&addr)?,
        None => config.admin.clone(),
    };

    treasury.reserve_balance -= amount;
    treasury.reserve_withdrawn += amount;
    TREASURY.save(deps.storage, &treasury)?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(amount.u128(), &config.denom),
        })
        .add_attribute("action", "withdraw_reserve")
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("origami_reserve_withdrawn")
                .add_attribute("recipient", recipient.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("remaining_reserve", treasury.reserve_balance.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}
