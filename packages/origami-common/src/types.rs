use cosmwasm_schema::cw_serde;

/// The three colored NFTs that rotate between ticket holders.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum NftColor {
    Red,
    Green,
    Blue,
}

impl NftColor {
    /// Draw and payout order.
    pub const ALL: [NftColor; 3] = [NftColor::Red, NftColor::Green, NftColor::Blue];

    pub fn as_str(&self) -> &'static str {
        match self {
            NftColor::Red => "red",
            NftColor::Green => "green",
            NftColor::Blue => "blue",
        }
    }

    /// Stable key used for the owner registry in contract storage.
    pub fn storage_key(&self) -> u8 {
        match self {
            NftColor::Red => 0,
            NftColor::Green => 1,
            NftColor::Blue => 2,
        }
    }
}

/// Main prize split between the three NFT holders, in basis points.
#[cw_serde]
pub struct PrizeSplit {
    pub red_bps: u16,
    pub green_bps: u16,
    pub blue_bps: u16,
}

impl PrizeSplit {
    pub fn bps(&self, color: NftColor) -> u16 {
        match color {
            NftColor::Red => self.red_bps,
            NftColor::Green => self.green_bps,
            NftColor::Blue => self.blue_bps,
        }
    }

    pub fn total(&self) -> u32 {
        self.red_bps as u32 + self.green_bps as u32 + self.blue_bps as u32
    }
}

/// Where the raffle is in its lifecycle.
#[cw_serde]
pub enum RafflePhase {
    /// No ticket sold yet; the campaign clock has not started.
    NotStarted,
    /// Tickets on sale and NFTs rotating daily.
    Active,
    /// Past the end date; main prize not fully paid out.
    Ended,
    /// Every main prize installment has been paid.
    Settled,
}
