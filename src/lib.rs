//! Spin Rewards - Promotional Rewards Platform Backend
//!
//! This crate implements a rewards platform where payment-confirmed users
//! earn raffle entries, referral commissions, and prize-wheel points.
//! Payment gateways confirm purchases via webhooks; entitlements gate
//! raffle participation and expire on a durable job schedule.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
