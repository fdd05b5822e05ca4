//! Integration tests for the Origami raffle.
//!
//! These tests drive the contract through its `instantiate` / `execute` /
//! `query` entry points using `cosmwasm_std::testing` mocks, following a
//! raffle from the first ticket to the last payout.
//!
//! Run:
//! ```bash
//! cargo test -p origami-integration-tests
//! ```

use std::collections::VecDeque;

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coins, from_json, Addr, BankMsg, CosmosMsg, Env, MemoryStorage, OwnedDeps, Response,
    Timestamp, Uint128,
};
use origami_common::{BeaconRng, NftColor, PrizeSplit, RafflePhase, RandomSource};
use origami_raffle::contract;
use origami_raffle::msg::{
    ExecuteMsg, HolderTicketsResponse, HoldersResponse, InstantiateMsg, NftOwnersResponse,
    QueryMsg, ReassignmentHistoryResponse, ScheduleResponse,
};
use origami_raffle::state::{MainPayout, Reassignment, Treasury};
use origami_raffle::ContractError;
use sha2::{Digest, Sha256};

// ─── Constants ───

const DENOM: &str = "inj";
const DAY: u64 = 86_400;

/// Real drand quicknet public key
const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";
const QUICKNET_GENESIS: u64 = 1692803367;

/// Real quicknet test vector: round 1000
const TEST_ROUND: u64 = 1000;
const TEST_ROUND_TIME: u64 = QUICKNET_GENESIS + 999 * 3;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";

/// Tickets go on sale so the first rotation slot opens five minutes
/// before round 1000 is published.
const SALE_TIME: u64 = TEST_ROUND_TIME - DAY - 300;

type TestDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Helpers ───

struct FixedDraws(VecDeque<u32>);

impl RandomSource for FixedDraws {
    fn next_index(&mut self, bound: u32) -> Option<u32> {
        self.0.pop_front().map(|draw| draw % bound)
    }
}

fn instantiate_msg() -> InstantiateMsg {
    InstantiateMsg {
        denom: DENOM.to_string(),
        max_tickets: 100,
        start_price: Uint128::new(5_000_000),
        price_increment: Uint128::new(200_000),
        reserve_per_ticket: Uint128::new(1_000_000),
        small_prize_bps: 2500,
        main_prize_split: PrizeSplit {
            red_bps: 6000,
            green_bps: 3000,
            blue_bps: 1000,
        },
        campaign_duration_seconds: 30 * DAY,
        reassignment_interval_seconds: DAY,
        small_prize_interval_seconds: 7 * DAY,
        small_prize_rounds: 4,
        vesting_installments: 2,
        vesting_interval_seconds: 7 * DAY,
        drand_pubkey_hex: QUICKNET_PK_HEX.to_string(),
        drand_genesis_time: QUICKNET_GENESIS,
        drand_period_seconds: 3,
    }
}

fn setup_raffle(deps: &mut TestDeps) {
    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    contract::instantiate(deps.as_mut(), env_at(SALE_TIME - DAY), info, instantiate_msg())
        .unwrap();
}

fn env_at(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = Timestamp::from_seconds(seconds);
    env
}

fn run(deps: &mut TestDeps, at: u64, sender: &str, funds: u128, msg: ExecuteMsg) -> Result<Response, ContractError> {
    let sender = deps.api.addr_make(sender);
    let funds = if funds == 0 { vec![] } else { coins(funds, DENOM) };
    contract::execute(deps.as_mut(), env_at(at), message_info(&sender, &funds), msg)
}

fn query<T: serde::de::DeserializeOwned>(deps: &TestDeps, at: u64, msg: QueryMsg) -> T {
    from_json(contract::query(deps.as_ref(), env_at(at), msg).unwrap()).unwrap()
}

fn bank_total(res: &Response) -> u128 {
    res.messages
        .iter()
        .map(|m| match &m.msg {
            CosmosMsg::Bank(BankMsg::Send { amount, .. }) => amount[0].amount.u128(),
            _ => 0,
        })
        .sum()
}

fn sends_to(res: &Response) -> Vec<(String, u128)> {
    res.messages
        .iter()
        .filter_map(|m| match &m.msg {
            CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                Some((to_address.clone(), amount[0].amount.u128()))
            }
            _ => None,
        })
        .collect()
}

/// Sells six tickets at SALE_TIME; alice buys twice.
fn sell_tickets(deps: &mut TestDeps) -> Vec<Addr> {
    let buyers = ["alice", "bob", "carol", "dave", "alice", "erin"];
    for (i, name) in buyers.iter().enumerate() {
        let price = 5_000_000 + (i as u128) * 200_000;
        run(deps, SALE_TIME, name, price, ExecuteMsg::BuyTicket {}).unwrap();
    }
    buyers.iter().map(|name| deps.api.addr_make(name)).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_raffle_lifecycle() {
    let mut deps = mock_dependencies();
    setup_raffle(&mut deps);

    let schedule: ScheduleResponse = query(&deps, SALE_TIME - 1, QueryMsg::Schedule {});
    assert_eq!(schedule.phase, RafflePhase::NotStarted);

    // 1. Sale: 5.0 .. 6.0 INJ over six tickets
    let roster = sell_tickets(&mut deps);
    let alice = deps.api.addr_make("alice");
    let end = SALE_TIME + 30 * DAY;

    let treasury: Treasury = query(&deps, SALE_TIME, QueryMsg::Treasury {});
    assert_eq!(treasury.total_collected, Uint128::new(33_000_000));
    assert_eq!(treasury.reserve_balance, Uint128::new(6_000_000));
    assert_eq!(treasury.small_prize_pool, Uint128::new(6_750_000));
    assert_eq!(treasury.main_prize_pool, Uint128::new(20_250_000));

    let tickets: HolderTicketsResponse = query(
        &deps,
        SALE_TIME,
        QueryMsg::HolderTickets {
            address: alice.to_string(),
        },
    );
    assert_eq!(tickets.tickets, 2);

    let page: HoldersResponse = query(
        &deps,
        SALE_TIME,
        QueryMsg::Holders {
            start_after: None,
            limit: Some(4),
        },
    );
    assert_eq!(page.holders.len(), 4);
    assert_eq!(page.holders[3].holder, roster[3]);
    let page: HoldersResponse = query(
        &deps,
        SALE_TIME,
        QueryMsg::Holders {
            start_after: Some(3),
            limit: None,
        },
    );
    let ids: Vec<u32> = page.holders.iter().map(|h| h.ticket_id).collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(page.holders[0].holder, alice);

    // 2. First rotation with the real round 1000 beacon; not before the
    //    first slot opens
    let err = run(
        &mut deps,
        SALE_TIME + 60,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::ReassignmentNotDue { .. }));

    let rotated_at = TEST_ROUND_TIME + 30;
    run(
        &mut deps,
        rotated_at,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap();

    // Draws are reproducible off-chain from the published signature
    let signature = hex::decode(TEST_SIG_HEX).unwrap();
    let seed: [u8; 32] = Sha256::digest(&signature).into();
    let mut rng = BeaconRng::new(seed);
    let record: Reassignment = query(&deps, rotated_at, QueryMsg::Reassignment { id: 0 });
    for draw in &record.draws {
        let expected = rng.next_index(roster.len() as u32).unwrap();
        assert_eq!(draw.index, expected);
        assert_eq!(draw.new_owner, roster[expected as usize]);
    }

    let schedule: ScheduleResponse = query(&deps, rotated_at, QueryMsg::Schedule {});
    assert_eq!(schedule.phase, RafflePhase::Active);
    assert_eq!(schedule.reassignment_count, 1);
    assert_eq!(schedule.last_drand_round, TEST_ROUND);
    assert_eq!(
        schedule.next_reassignment_at,
        Some(Timestamp::from_seconds(rotated_at + DAY))
    );

    // 3. Second rotation a day later; bob takes red, carol green, erin blue
    let mut draws = FixedDraws(VecDeque::from(vec![1, 2, 5]));
    origami_raffle::execute::reassign_nfts(
        deps.as_mut(),
        &env_at(rotated_at + DAY),
        TEST_ROUND + 28_800,
        &mut draws,
    )
    .unwrap();

    let history: ReassignmentHistoryResponse = query(
        &deps,
        rotated_at + DAY,
        QueryMsg::ReassignmentHistory {
            start_after: None,
            limit: None,
        },
    );
    assert_eq!(history.reassignments.len(), 2);
    let history: ReassignmentHistoryResponse = query(
        &deps,
        rotated_at + DAY,
        QueryMsg::ReassignmentHistory {
            start_after: Some(0),
            limit: None,
        },
    );
    assert_eq!(history.reassignments[0].id, 1);

    let owners: NftOwnersResponse = query(&deps, rotated_at + DAY, QueryMsg::NftOwners {});
    let owner = |color: NftColor| {
        owners
            .owners
            .iter()
            .find(|o| o.color == color)
            .and_then(|o| o.owner.clone())
            .unwrap()
    };
    assert_eq!(owner(NftColor::Red), roster[1]);
    assert_eq!(owner(NftColor::Green), roster[2]);
    assert_eq!(owner(NftColor::Blue), roster[5]);

    // 4. First small prize round: 6.75 / 4 = 1.6875, 0.5625 per NFT
    let mut paid_out = 0u128;
    let res = run(
        &mut deps,
        SALE_TIME + 7 * DAY,
        "anyone",
        0,
        ExecuteMsg::DistributeSmallPrizes {},
    )
    .unwrap();
    assert_eq!(
        sends_to(&res),
        vec![
            (roster[1].to_string(), 562_500),
            (roster[2].to_string(), 562_500),
            (roster[5].to_string(), 562_500),
        ]
    );
    paid_out += bank_total(&res);

    // 5. The end date closes the sale and stops rotations
    let err = run(&mut deps, end, "frank", 10_000_000, ExecuteMsg::BuyTicket {}).unwrap_err();
    assert!(
        format!("{:?}", err).contains("SaleClosed"),
        "Expected sale closed, got: {:?}",
        err
    );
    let mut draws = FixedDraws(VecDeque::from(vec![0, 0, 0]));
    let err = origami_raffle::execute::reassign_nfts(
        deps.as_mut(),
        &env_at(end),
        TEST_ROUND + 1_000_000,
        &mut draws,
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::CampaignEnded { .. }));

    let schedule: ScheduleResponse = query(&deps, end, QueryMsg::Schedule {});
    assert_eq!(schedule.phase, RafflePhase::Ended);
    assert!(schedule.next_reassignment_at.is_none());

    // 6. Main prize in two installments; 20.25 split 60/30/10
    let res = run(&mut deps, end, "anyone", 0, ExecuteMsg::DistributeMainPrizes {}).unwrap();
    assert_eq!(
        sends_to(&res),
        vec![
            (roster[1].to_string(), 6_075_000),
            (roster[2].to_string(), 3_037_500),
            (roster[5].to_string(), 1_012_500),
        ]
    );
    paid_out += bank_total(&res);

    let err = run(&mut deps, end + DAY, "anyone", 0, ExecuteMsg::DistributeMainPrizes {})
        .unwrap_err();
    assert!(matches!(err, ContractError::NoInstallmentDue { .. }));

    let res = run(
        &mut deps,
        end + 7 * DAY,
        "anyone",
        0,
        ExecuteMsg::DistributeMainPrizes {},
    )
    .unwrap();
    paid_out += bank_total(&res);

    let payout: Option<MainPayout> = query(&deps, end + 7 * DAY, QueryMsg::MainPayout {});
    let payout = payout.unwrap();
    assert!(payout.is_settled());
    assert_eq!(payout.total, Uint128::new(20_250_000));

    let schedule: ScheduleResponse = query(&deps, end + 7 * DAY, QueryMsg::Schedule {});
    assert_eq!(schedule.phase, RafflePhase::Settled);

    // 7. Remaining small rounds drain the pool
    for round in 2..=4u64 {
        let res = run(
            &mut deps,
            end + 7 * DAY * round,
            "anyone",
            0,
            ExecuteMsg::DistributeSmallPrizes {},
        )
        .unwrap();
        paid_out += bank_total(&res);
    }
    let err = run(
        &mut deps,
        end + 60 * DAY,
        "anyone",
        0,
        ExecuteMsg::DistributeSmallPrizes {},
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::SmallPrizesExhausted { rounds: 4 }));

    // 8. Admin takes the reserve
    let res = run(
        &mut deps,
        end + 60 * DAY,
        "admin",
        0,
        ExecuteMsg::WithdrawReserve {
            amount: None,
            recipient: None,
        },
    )
    .unwrap();
    assert_eq!(bank_total(&res), 6_000_000);
    paid_out += bank_total(&res);

    // Every unit collected has left the contract exactly once
    let treasury: Treasury = query(&deps, end + 60 * DAY, QueryMsg::Treasury {});
    assert_eq!(paid_out, treasury.total_collected.u128());
    assert_eq!(treasury.accounted(), treasury.total_collected);
    assert!(treasury.reserve_balance.is_zero());
    assert!(treasury.small_prize_pool.is_zero());
    assert!(treasury.main_prize_pool.is_zero());

    eprintln!("test_full_raffle_lifecycle passed");
}

#[test]
fn test_beacon_submission_rules() {
    let mut deps = mock_dependencies();
    setup_raffle(&mut deps);

    // No tickets yet: nothing to rotate
    let err = run(
        &mut deps,
        TEST_ROUND_TIME + 30,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::NoHolders));

    sell_tickets(&mut deps);

    // Signature for a different round
    let err = run(
        &mut deps,
        TEST_ROUND_TIME + 30,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND + 3,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(
        format!("{:?}", err).contains("VerificationFailed"),
        "Expected verification failure, got: {:?}",
        err
    );

    run(
        &mut deps,
        TEST_ROUND_TIME + 30,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap();

    // A newer round published before the next slot opened is rejected
    let err = run(
        &mut deps,
        TEST_ROUND_TIME + 30 + DAY,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND + 100,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::BeaconTooOld { .. }));

    // Replaying the used round is rejected before anything else
    let err = run(
        &mut deps,
        TEST_ROUND_TIME + 30 + DAY,
        "keeper",
        0,
        ExecuteMsg::TransferNfts {
            drand_round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::StaleBeacon { .. }));

    let schedule: ScheduleResponse = query(&deps, TEST_ROUND_TIME + DAY, QueryMsg::Schedule {});
    assert_eq!(schedule.reassignment_count, 1);

    eprintln!("test_beacon_submission_rules passed");
}

#[test]
fn test_reserve_is_admin_only() {
    let mut deps = mock_dependencies();
    setup_raffle(&mut deps);
    sell_tickets(&mut deps);

    let err = run(
        &mut deps,
        SALE_TIME,
        "alice",
        0,
        ExecuteMsg::WithdrawReserve {
            amount: None,
            recipient: None,
        },
    )
    .unwrap_err();
    assert!(
        format!("{:?}", err).contains("Unauthorized"),
        "Expected unauthorized error, got: {:?}",
        err
    );

    // The reserve is withdrawable mid-campaign without touching the prize pools
    let vault = deps.api.addr_make("vault");
    let res = run(
        &mut deps,
        SALE_TIME + DAY,
        "admin",
        0,
        ExecuteMsg::WithdrawReserve {
            amount: Some(Uint128::new(2_500_000)),
            recipient: Some(vault.to_string()),
        },
    )
    .unwrap();
    assert_eq!(sends_to(&res), vec![(vault.to_string(), 2_500_000)]);

    let treasury: Treasury = query(&deps, SALE_TIME + DAY, QueryMsg::Treasury {});
    assert_eq!(treasury.reserve_balance, Uint128::new(3_500_000));
    assert_eq!(treasury.small_prize_pool, Uint128::new(6_750_000));
    assert_eq!(treasury.main_prize_pool, Uint128::new(20_250_000));
    assert_eq!(treasury.accounted(), treasury.total_collected);
}
