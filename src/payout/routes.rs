//! Payout API route handlers.
//!
//! Thin JSON handlers: extract, call the service layer, map results to
//! response DTOs. The engine's errors are translated to HTTP statuses here.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::AppState;

use super::requests::{
    CancelShowRequest, PayoutPreviewRequest, RetainedAllocationsRequest, SaveShowMembersRequest,
};
use super::responses::{
    AllocationResponse, AllocationsResponse, CancelShowResponse, MemberEarningsResponse,
    PaidToggleResponse, PreviewResponse, ReconciliationResponse, RestoreShowResponse,
    SettlementResponse, ShowMemberResponse,
};
use super::services::{self, AllocationsResult, PayoutError, SettlementResult};

impl From<PayoutError> for AppError {
    fn from(e: PayoutError) -> Self {
        match e {
            PayoutError::ShowNotFound { .. } | PayoutError::MemberNotFound { .. } => {
                AppError::NotFound
            }
            PayoutError::Database(e) => AppError::Database(e),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Build the payout API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/shows/:id/members",
            put(save_show_members).get(show_settlement),
        )
        .route("/shows/:id/settlement", get(show_settlement))
        .route("/shows/:id/paid", post(toggle_paid))
        .route("/shows/:id/cancel", post(cancel_show))
        .route("/shows/:id/restore", post(restore_show))
        .route(
            "/shows/:id/retained-allocations",
            put(save_retained_allocations).get(list_retained_allocations),
        )
        .route("/payouts/preview", post(preview_payouts))
        .route("/members/:id/earnings", get(member_earnings))
}

/// PUT /api/shows/:id/members - replace the show's member list
async fn save_show_members(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    Json(request): Json<SaveShowMembersRequest>,
) -> Result<Json<SettlementResponse>> {
    let result = services::save_show_members(&state.db, &state.cache, show_id, request).await?;
    Ok(Json(settlement_response(result)))
}

/// GET /api/shows/:id/settlement - reconciliation summary for the detail page
async fn show_settlement(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<SettlementResponse>> {
    let result = services::show_settlement(&state.db, show_id).await?;
    Ok(Json(settlement_response(result)))
}

/// POST /api/shows/:id/paid - toggle the paid flag
async fn toggle_paid(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<PaidToggleResponse>> {
    let is_paid = services::toggle_paid(&state.db, show_id).await?;
    Ok(Json(PaidToggleResponse { show_id, is_paid }))
}

/// POST /api/shows/:id/cancel - cancel with refund accounting
async fn cancel_show(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    Json(request): Json<CancelShowRequest>,
) -> Result<Json<CancelShowResponse>> {
    let breakdown = services::cancel_show(&state.db, show_id, request).await?;
    Ok(Json(CancelShowResponse {
        show_id,
        status: crate::models::ShowStatus::Cancelled,
        breakdown: breakdown.into(),
    }))
}

/// POST /api/shows/:id/restore - undo a cancellation
async fn restore_show(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<RestoreShowResponse>> {
    let status = services::restore_show(&state.db, show_id).await?;
    Ok(Json(RestoreShowResponse { show_id, status }))
}

/// PUT /api/shows/:id/retained-allocations - distribute retained funds
async fn save_retained_allocations(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    Json(request): Json<RetainedAllocationsRequest>,
) -> Result<Json<AllocationsResponse>> {
    let result =
        services::save_retained_allocations(&state.db, &state.cache, show_id, request).await?;
    Ok(Json(allocations_response(result)))
}

/// GET /api/shows/:id/retained-allocations
async fn list_retained_allocations(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<AllocationsResponse>> {
    let result = services::list_retained_allocations(&state.db, show_id).await?;
    Ok(Json(allocations_response(result)))
}

/// POST /api/payouts/preview - pure calculation, nothing persisted
async fn preview_payouts(
    Json(request): Json<PayoutPreviewRequest>,
) -> Result<Json<PreviewResponse>> {
    Ok(Json(services::preview_payouts(request)))
}

/// GET /api/members/:id/earnings - a member's frozen payouts across shows
async fn member_earnings(
    State(state): State<AppState>,
    Path(band_member_id): Path<Uuid>,
) -> Result<Json<MemberEarningsResponse>> {
    let member = db::queries::get_band_member(&state.db, band_member_id).await?;
    let shows = db::queries::get_member_show_earnings(&state.db, band_member_id).await?;
    let total_earned = shows.iter().map(|s| s.calculated_amount).sum();

    Ok(Json(MemberEarningsResponse {
        band_member_id,
        name: member.name,
        total_earned,
        shows,
    }))
}

fn settlement_response(result: SettlementResult) -> SettlementResponse {
    SettlementResponse {
        show_id: result.show.id,
        status: result.show.status,
        is_paid: result.show.is_paid,
        total_amount: result.show.total_amount,
        total_expenses: result.total_expenses,
        reconciliation: ReconciliationResponse::from(result.reconciliation),
        members: result
            .members
            .into_iter()
            .map(ShowMemberResponse::from)
            .collect(),
    }
}

fn allocations_response(result: AllocationsResult) -> AllocationsResponse {
    AllocationsResponse {
        show_id: result.show_id,
        retained_amount: result.retained_amount,
        allocations: result
            .allocations
            .into_iter()
            .map(AllocationResponse::from)
            .collect(),
    }
}
