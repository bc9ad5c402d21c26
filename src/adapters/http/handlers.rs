//! HTTP handlers connecting axum routes to application command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::handlers::payment::{
    BankWebhookResult, CheckoutWebhookResult, HandleBankWebhookCommand, HandleBankWebhookHandler,
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler,
};
use crate::application::handlers::raffle::{
    CreateRaffleCommand, CreateRaffleHandler, CreateRaffleResult,
};
use crate::application::handlers::referral::{CreateReferralCommand, CreateReferralHandler};
use crate::application::handlers::user::{
    DeleteUserHandler, RegisterUserCommand, RegisterUserHandler, SpinWheelHandler,
};
use crate::config::PaymentConfig;
use crate::domain::entitlement::{
    CheckoutWebhookVerifier, EntitlementPipeline, EntitlementResolver, WebhookError,
};
use crate::domain::foundation::{DomainError, ErrorCode, RaffleId, ReferralId, UserId};
use crate::ports::{
    JobStore, RaffleRepository, ReferralRepository, UserRepository, WebhookEventRepository,
};

use super::dto::{
    CreateRaffleRequest, CreateRaffleResponse, CreateReferralRequest, ErrorResponse,
    PaymentResultQuery, RaffleResponse, ReferralResponse, RegisterUserRequest, SpinResponse,
    UserResponse, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub raffles: Arc<dyn RaffleRepository>,
    pub referrals: Arc<dyn ReferralRepository>,
    pub jobs: Arc<dyn JobStore>,
    pub pipeline: Arc<EntitlementPipeline>,
    pub payment: PaymentConfig,
}

impl AppState {
    /// Wires the state from the ports and payment configuration.
    pub fn new(
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        referrals: Arc<dyn ReferralRepository>,
        events: Arc<dyn WebhookEventRepository>,
        jobs: Arc<dyn JobStore>,
        payment: PaymentConfig,
    ) -> Self {
        let pipeline = Arc::new(EntitlementPipeline::new(
            EntitlementResolver::new(payment.basic_plan_amount, payment.premium_plan_amount),
            users.clone(),
            raffles.clone(),
            referrals.clone(),
            events,
            jobs.clone(),
        ));
        Self {
            users,
            raffles,
            referrals,
            jobs,
            pipeline,
            payment,
        }
    }

    fn checkout_webhook_handler(&self) -> HandleCheckoutWebhookHandler {
        HandleCheckoutWebhookHandler::new(
            CheckoutWebhookVerifier::new(self.payment.checkout_webhook_secret.clone()),
            self.pipeline.clone(),
        )
    }

    fn bank_webhook_handler(&self) -> HandleBankWebhookHandler {
        HandleBankWebhookHandler::new(self.pipeline.clone())
    }

    fn register_user_handler(&self) -> RegisterUserHandler {
        RegisterUserHandler::new(self.users.clone())
    }

    fn delete_user_handler(&self) -> DeleteUserHandler {
        DeleteUserHandler::new(self.users.clone(), self.raffles.clone())
    }

    fn spin_wheel_handler(&self) -> SpinWheelHandler {
        SpinWheelHandler::new(self.users.clone())
    }

    fn create_raffle_handler(&self) -> CreateRaffleHandler {
        CreateRaffleHandler::new(self.users.clone(), self.raffles.clone(), self.jobs.clone())
    }

    fn create_referral_handler(&self) -> CreateReferralHandler {
        CreateReferralHandler::new(self.users.clone(), self.referrals.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Webhook Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/checkout - signed checkout gateway webhook
pub async fn handle_checkout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = required_header(&headers, "X-Request-Id")?;
    let timestamp = required_header(&headers, "X-Webhook-Timestamp")?;
    let signature = required_header(&headers, "X-Webhook-Signature")?;

    let result = state
        .checkout_webhook_handler()
        .handle(HandleCheckoutWebhookCommand {
            request_id,
            timestamp,
            signature,
            payload: body.to_vec(),
        })
        .await?;

    let ack = match result {
        CheckoutWebhookResult::Processed => WebhookAck {
            status: "processed",
        },
        CheckoutWebhookResult::AlreadyProcessed => WebhookAck {
            status: "already_processed",
        },
        CheckoutWebhookResult::Ignored => WebhookAck { status: "ignored" },
    };
    Ok(Json(ack))
}

/// POST /api/webhooks/bank - bank transfer gateway notice
///
/// The gateway expects a plain-text body in every branch except a
/// validation failure.
pub async fn handle_bank_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let result = state
        .bank_webhook_handler()
        .handle(HandleBankWebhookCommand {
            payload: body.to_vec(),
        })
        .await;

    match result {
        Ok(BankWebhookResult::Processed) | Ok(BankWebhookResult::AlreadyProcessed) => {
            (StatusCode::OK, "OK").into_response()
        }
        Ok(BankWebhookResult::Ignored { .. }) => (StatusCode::OK, "IGNORED").into_response(),
        Err(e) => (e.status_code(), e.to_string()).into_response(),
    }
}

/// GET /api/payments/result/{user_id} - hosted-checkout browser callback
///
/// Redirects the user's browser to the frontend; entitlement state is
/// driven by the webhook, never by this callback.
pub async fn payment_result_redirect(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PaymentResultQuery>,
) -> Redirect {
    let target = if query.result_code == "0000" {
        &state.payment.success_redirect_url
    } else {
        &state.payment.failure_redirect_url
    };
    tracing::info!(user_id = %user_id, result_code = %query.result_code, "payment redirect");
    Redirect::to(target)
}

// ════════════════════════════════════════════════════════════════════════════
// User Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/users - register a new user
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .register_user_handler()
        .handle(RegisterUserCommand {
            email: request.email,
            phone: request.phone,
            password_hash: request.password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/users/{id} - fetch a user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&id)?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/users/{id} - delete a user, cascading raffle entries
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&id)?;
    state.delete_user_handler().handle(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/spin - take a prize-wheel spin
pub async fn spin_wheel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&id)?;
    let result = state.spin_wheel_handler().handle(user_id).await?;

    Ok(Json(SpinResponse {
        points_awarded: result.points_awarded,
        total_points: result.total_points,
        spin_count: result.spin_count,
    }))
}

// ════════════════════════════════════════════════════════════════════════════
// Raffle Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/raffles - schedule a raffle
pub async fn create_raffle(
    State(state): State<AppState>,
    Json(request): Json<CreateRaffleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_raffle_handler()
        .handle(CreateRaffleCommand {
            prizes: request.prizes,
            scheduled_at: request.scheduled_at,
        })
        .await?;

    let response = match result {
        CreateRaffleResult::Scheduled { raffle_id } => CreateRaffleResponse {
            raffle_id: raffle_id.to_string(),
            status: "scheduled".to_string(),
        },
        CreateRaffleResult::DeletedPastDue { raffle_id } => CreateRaffleResponse {
            raffle_id: raffle_id.to_string(),
            status: "deleted_past_due".to_string(),
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/raffles/{id} - fetch a raffle
pub async fn get_raffle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let raffle_id: RaffleId = id
        .parse()
        .map_err(|_| DomainError::validation("raffle_id", "Malformed raffle id"))?;
    let raffle = state
        .raffles
        .find_by_id(&raffle_id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::RaffleNotFound, "Raffle not found"))?;

    Ok(Json(RaffleResponse::from(&raffle)))
}

/// GET /api/raffles - list raffles, newest first
pub async fn list_raffles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let raffles = state.raffles.list().await?;
    let response: Vec<RaffleResponse> = raffles.iter().map(RaffleResponse::from).collect();
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════
// Referral Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/referrals - record a referral edge
pub async fn create_referral(
    State(state): State<AppState>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let referrer = parse_user_id(&request.referrer_id)?;
    let referred = parse_user_id(&request.referred_id)?;

    let referral = state
        .create_referral_handler()
        .handle(CreateReferralCommand { referrer, referred })
        .await?;

    Ok((StatusCode::CREATED, Json(ReferralResponse::from(&referral))))
}

/// GET /api/referrals/{id} - fetch a referral
pub async fn get_referral(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let referral_id: ReferralId = id
        .parse()
        .map_err(|_| DomainError::validation("referral_id", "Malformed referral id"))?;
    let referral = state
        .referrals
        .find_by_id(&referral_id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::ReferralNotFound, "Referral not found"))?;

    Ok(Json(ReferralResponse::from(&referral)))
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers and Error Handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| DomainError::validation("user_id", "Malformed user id").into())
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| WebhookError::MissingField(name).into())
}

/// API error type that converts domain and webhook errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Webhook(WebhookError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::Webhook(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Domain(e) => {
                let status = match e.code {
                    ErrorCode::ValidationFailed
                    | ErrorCode::EmptyField
                    | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
                    ErrorCode::UserNotFound
                    | ErrorCode::RaffleNotFound
                    | ErrorCode::ReferralNotFound
                    | ErrorCode::JobNotFound => StatusCode::NOT_FOUND,
                    ErrorCode::UserExists
                    | ErrorCode::DuplicateEvent
                    | ErrorCode::InvalidStateTransition
                    | ErrorCode::RaffleAlreadyCompleted => StatusCode::CONFLICT,
                    ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                    ErrorCode::DatabaseError | ErrorCode::InternalError => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %e, "request failed");
                }
                (status, ErrorResponse::new(e.code.to_string(), e.message))
            }
            ApiError::Webhook(e) => {
                let status = e.status_code();
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %e, "webhook processing failed");
                }
                (status, ErrorResponse::new("WEBHOOK_ERROR", e.to_string()))
            }
        };
        (status, Json(body)).into_response()
    }
}
