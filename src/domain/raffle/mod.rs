//! Raffle domain - scheduled prize drawings.

mod raffle;

pub use raffle::{Raffle, RaffleError, RaffleStatus};
