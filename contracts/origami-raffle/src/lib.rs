pub mod contract;
pub mod error;
pub mod execute;
pub mod msg;
pub mod query;
pub mod state;
pub mod treasury;
pub mod verify;

pub use crate::error::ContractError;
