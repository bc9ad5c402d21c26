//! User domain - platform participants and their entitlement state.

mod user;

pub use user::User;
