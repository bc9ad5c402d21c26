//! Raffle command handlers.

mod create_raffle;

pub use create_raffle::{CreateRaffleCommand, CreateRaffleHandler, CreateRaffleResult};
