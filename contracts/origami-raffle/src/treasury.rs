use cosmwasm_std::{OverflowError, Timestamp, Uint128};
use origami_common::{NftColor, PrizeSplit};

const BPS_DENOMINATOR: u128 = 10_000;

/// How a single ticket payment is divided. The three parts always sum to the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSplit {
    pub reserve: Uint128,
    pub small_prize: Uint128,
    pub main_prize: Uint128,
}

/// Split a payment into the fixed reserve, the small prize share of the
/// remainder and the main prize (everything left).
pub fn split_payment(
    payment: Uint128,
    reserve_per_ticket: Uint128,
    small_prize_bps: u16,
) -> Result<PaymentSplit, OverflowError> {
    let remainder = payment.checked_sub(reserve_per_ticket)?;
    let small_prize = remainder.multiply_ratio(small_prize_bps as u128, BPS_DENOMINATOR);
    let main_prize = remainder.checked_sub(small_prize)?;

    Ok(PaymentSplit {
        reserve: reserve_per_ticket,
        small_prize,
        main_prize,
    })
}

/// Per-colour shares of the main prize. Blue absorbs the rounding remainder
/// so the shares sum to `total` exactly.
pub fn main_prize_shares(total: Uint128, split: &PrizeSplit) -> Vec<(NftColor, Uint128)> {
    let red = total.multiply_ratio(split.bps(NftColor::Red) as u128, BPS_DENOMINATOR);
    let green = total.multiply_ratio(split.bps(NftColor::Green) as u128, BPS_DENOMINATOR);
    let blue = total.saturating_sub(red).saturating_sub(green);
    vec![
        (NftColor::Red, red),
        (NftColor::Green, green),
        (NftColor::Blue, blue),
    ]
}

/// Split an amount evenly across the three colours; red takes the remainder.
pub fn split_evenly(amount: Uint128) -> Vec<(NftColor, Uint128)> {
    let count = Uint128::from(NftColor::ALL.len() as u128);
    let per_color = amount / count;
    let remainder = amount - per_color * count;

    NftColor::ALL
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let mut share = per_color;
            if i == 0 {
                share += remainder;
            }
            (*color, share)
        })
        .collect()
}

/// Number of installments due at `now`. Installment k is due at
/// `starts_at + k * interval`, so the first one is due at `starts_at`.
pub fn installments_due(
    starts_at: Timestamp,
    interval_seconds: u64,
    installments: u32,
    now: Timestamp,
) -> u32 {
    if now < starts_at {
        return 0;
    }
    if interval_seconds == 0 {
        return installments;
    }
    let elapsed_intervals = (now.seconds() - starts_at.seconds()) / interval_seconds;
    let due = elapsed_intervals.saturating_add(1);
    due.min(installments as u64) as u32
}

/// Cumulative amount of `share` vested after `due` of `installments`.
/// The final installment vests the exact remainder.
pub fn vested_amount(share: Uint128, due: u32, installments: u32) -> Uint128 {
    if installments == 0 || due >= installments {
        return share;
    }
    share.multiply_ratio(due as u128, installments as u128)
}

/// Start time of installment `index` (0-based).
pub fn installment_time(starts_at: Timestamp, interval_seconds: u64, index: u32) -> Timestamp {
    starts_at.plus_seconds(interval_seconds.saturating_mul(index as u64))
}
