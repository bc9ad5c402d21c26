//! HTTP DTOs (Data Transfer Objects) for the REST API.
//!
//! These types define the JSON request/response structure and serve as
//! the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::PlanTier;
use crate::domain::raffle::{Raffle, RaffleStatus};
use crate::domain::referral::{Referral, ReferralStatus};
use crate::domain::user::User;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to register a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub phone: String,
    /// Pre-hashed credential; hashing happens upstream of this service.
    pub password_hash: String,
}

/// Request to schedule a raffle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRaffleRequest {
    pub prizes: Vec<String>,
    /// Drawing time (RFC 3339).
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
}

/// Request to record a referral edge.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferralRequest {
    pub referrer_id: String,
    pub referred_id: String,
}

/// Query parameters on the hosted-checkout redirect callback.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResultQuery {
    pub result_code: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// User details for API responses. Never exposes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub tier: PlanTier,
    pub paid: bool,
    pub points: i64,
    pub referral_code: String,
    pub spin_count: u32,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            tier: user.tier,
            paid: user.paid,
            points: user.points,
            referral_code: user.referral_code.clone(),
            spin_count: user.spin_count,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Outcome of a prize-wheel spin.
#[derive(Debug, Clone, Serialize)]
pub struct SpinResponse {
    pub points_awarded: i64,
    pub total_points: i64,
    pub spin_count: u32,
}

/// Raffle details for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RaffleResponse {
    pub id: String,
    pub prizes: Vec<String>,
    pub participant_count: usize,
    pub winner: Option<String>,
    pub scheduled_at: String,
    pub status: RaffleStatus,
    pub created_at: String,
}

impl From<&Raffle> for RaffleResponse {
    fn from(raffle: &Raffle) -> Self {
        Self {
            id: raffle.id.to_string(),
            prizes: raffle.prizes.clone(),
            participant_count: raffle.participants.len(),
            winner: raffle.winner.map(|w| w.to_string()),
            scheduled_at: raffle.scheduled_at.to_rfc3339(),
            status: raffle.status,
            created_at: raffle.created_at.to_rfc3339(),
        }
    }
}

/// Outcome of raffle creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRaffleResponse {
    pub raffle_id: String,
    /// "scheduled" when the completion job is armed, "deleted_past_due"
    /// when the drawing time already elapsed.
    pub status: String,
}

/// Referral details for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralResponse {
    pub id: String,
    pub referrer_id: String,
    pub referred_id: String,
    pub status: ReferralStatus,
    pub commission: i64,
    pub created_at: String,
}

impl From<&Referral> for ReferralResponse {
    fn from(referral: &Referral) -> Self {
        Self {
            id: referral.id.to_string(),
            referrer_id: referral.referrer.to_string(),
            referred_id: referral.referred.to_string(),
            status: referral.status,
            commission: referral.commission,
            created_at: referral.created_at.to_rfc3339(),
        }
    }
}

/// Acknowledgment for the checkout webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    /// "processed", "already_processed", or "ignored".
    pub status: &'static str,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
