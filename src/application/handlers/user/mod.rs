//! User command handlers.

mod delete_user;
mod register_user;
mod spin_wheel;

pub use delete_user::DeleteUserHandler;
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use spin_wheel::{SpinResult, SpinWheelHandler, WHEEL_SEGMENTS};
