//! Usage endpoints - the route-side half of the quota contract.
//!
//! A caller gating a metered action checks first (`GET /api/usage/{kind}`),
//! performs the action, and records only once it succeeded
//! (`POST /api/usage/{kind}/attempts`). `POST /api/usage/{kind}/consume`
//! does the check and the record as one atomic step.

use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, web};

use quota_core::domain::FeatureKind;
use quota_core::ports::{Admission, admit};
use quota_shared::dto::{AttemptRequest, RecordResponse, UsageQuery, UsageResponse};

use super::usage_view;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::identity::{ATTEMPT_ID_HEADER, resolve_attempt_id, resolve_identity};
use crate::state::AppState;

type AttemptBody = Result<web::Json<AttemptRequest>, actix_web::Error>;

/// A request without a JSON content type carries no body fields; a JSON body
/// that fails to parse is rejected rather than silently ignored.
fn attempt_body(body: AttemptBody) -> AppResult<Option<AttemptRequest>> {
    match body {
        Ok(json) => Ok(Some(json.into_inner())),
        Err(e) => match e.as_error::<JsonPayloadError>() {
            Some(JsonPayloadError::ContentType) => Ok(None),
            _ => {
                tracing::debug!(error = %e, "Malformed attempt body");
                Err(AppError::BadRequest(format!("Malformed JSON body: {}", e)))
            }
        },
    }
}

/// GET /api/usage/today?kind=<kind>
pub async fn today(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<UsageQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let kind = match query.kind.as_deref() {
        Some(raw) => FeatureKind::parse(raw)?,
        None => state.default_kind.clone(),
    };

    usage_response(&state, &req, &query, kind).await
}

/// GET /api/usage/{kind}
pub async fn by_kind(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UsageQuery>,
) -> AppResult<HttpResponse> {
    let kind = FeatureKind::parse(path.into_inner())?;
    usage_response(&state, &req, &query.into_inner(), kind).await
}

async fn usage_response(
    state: &AppState,
    req: &HttpRequest,
    query: &UsageQuery,
    kind: FeatureKind,
) -> AppResult<HttpResponse> {
    let identity = resolve_identity(state, req, query, None).await?;
    let status = state.ledger.usage(&identity, &kind);

    tracing::debug!(
        identity = %identity,
        kind = %kind,
        used = status.used,
        blocked = status.blocked,
        "Usage queried"
    );

    Ok(HttpResponse::Ok().json(UsageResponse {
        usage: usage_view(&status),
    }))
}

/// POST /api/usage/{kind}/attempts
///
/// Records a consumption that already happened. Never refuses, even past
/// the limit.
pub async fn record(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UsageQuery>,
    body: AttemptBody,
) -> AppResult<HttpResponse> {
    let kind = FeatureKind::parse(path.into_inner())?;
    let query = query.into_inner();
    let body = attempt_body(body)?;

    let identity = resolve_identity(&state, &req, &query, body.as_ref()).await?;
    let attempt = resolve_attempt_id(&req, &query, body.as_ref());
    let outcome = state.ledger.record_attempt(&identity, &attempt, &kind);

    Ok(HttpResponse::Ok()
        .insert_header((ATTEMPT_ID_HEADER, attempt.as_str()))
        .json(RecordResponse {
            usage: usage_view(&outcome.status),
            was_new: outcome.was_new,
        }))
}

/// POST /api/usage/{kind}/consume
///
/// Checks the limit and records the attempt atomically. Retrying an attempt
/// that was already accepted succeeds with `wasNew: false`.
pub async fn consume(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UsageQuery>,
    body: AttemptBody,
) -> AppResult<HttpResponse> {
    let kind = FeatureKind::parse(path.into_inner())?;
    let query = query.into_inner();
    let body = attempt_body(body)?;

    let identity = resolve_identity(&state, &req, &query, body.as_ref()).await?;
    let attempt = resolve_attempt_id(&req, &query, body.as_ref());

    let (status, was_new) = match admit(&state.ledger, &identity, &attempt, &kind) {
        Admission::Granted(reservation) => {
            let outcome = reservation.commit();
            (outcome.status, outcome.was_new)
        }
        Admission::Replayed(status) => (status, false),
        Admission::InFlight(_) => {
            return Err(AppError::Conflict(format!(
                "Attempt {} is already in progress",
                attempt
            )));
        }
        Admission::LimitReached(status) => {
            tracing::info!(
                identity = %identity,
                kind = %kind,
                used = status.used,
                "Consume refused"
            );
            return Err(AppError::LimitReached { kind, status });
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((ATTEMPT_ID_HEADER, attempt.as_str()))
        .json(RecordResponse {
            usage: usage_view(&status),
            was_new,
        }))
}
