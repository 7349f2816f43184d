//! Payout service functions with database access.
//!
//! These load show facts and member configs, run the pure engine, and persist
//! the frozen results. All boundary validation lives here - the calculators
//! never validate or fail.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::models::{
    BandMember, NewShowMember, RefundType, RetainedFundAllocation, Show, ShowMember, ShowStatus,
};

use super::allocation::{self, Allocation, AllocationError, AllocationMember, AllocationStrategy};
use super::calculators::{compute_payout, PayoutInput, ShowFinancials};
use super::reconcile::{self, Reconciliation, RefundBreakdown};
use super::requests::{
    CancelShowRequest, PayoutPreviewRequest, RetainedAllocationsRequest, SaveShowMembersRequest,
};
use super::responses::{PreviewMemberResponse, PreviewResponse, ReconciliationResponse};

/// Payout service error types
#[derive(Debug)]
pub enum PayoutError {
    ShowNotFound { show_id: Uuid },
    MemberNotFound { band_member_id: Uuid },
    AlreadyCancelled { show_id: Uuid },
    NotCancelled { show_id: Uuid },
    RefundAmountRequired,
    RefundOutOfRange { requested: i64, available: i64 },
    Allocation(AllocationError),
    Database(sqlx::Error),
}

impl std::fmt::Display for PayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutError::ShowNotFound { show_id } => {
                write!(f, "Show {} not found", show_id)
            }
            PayoutError::MemberNotFound { band_member_id } => {
                write!(f, "Band member {} not found", band_member_id)
            }
            PayoutError::AlreadyCancelled { show_id } => {
                write!(f, "Show {} is already cancelled", show_id)
            }
            PayoutError::NotCancelled { show_id } => {
                write!(f, "Show {} is not cancelled", show_id)
            }
            PayoutError::RefundAmountRequired => {
                write!(f, "A refund amount is required for a partial refund")
            }
            PayoutError::RefundOutOfRange { requested, available } => {
                write!(
                    f,
                    "Refund amount {} is outside 0..={} available",
                    requested, available
                )
            }
            PayoutError::Allocation(e) => write!(f, "{}", e),
            PayoutError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for PayoutError {}

impl From<sqlx::Error> for PayoutError {
    fn from(e: sqlx::Error) -> Self {
        PayoutError::Database(e)
    }
}

impl From<AllocationError> for PayoutError {
    fn from(e: AllocationError) -> Self {
        PayoutError::Allocation(e)
    }
}

/// Result of a settlement computation or member-list save
#[derive(Debug)]
pub struct SettlementResult {
    pub show: Show,
    pub total_expenses: i64,
    pub members: Vec<ShowMember>,
    pub reconciliation: Reconciliation,
}

/// Result of a retained-funds allocation save or read
#[derive(Debug)]
pub struct AllocationsResult {
    pub show_id: Uuid,
    pub retained_amount: i64,
    pub allocations: Vec<RetainedFundAllocation>,
}

/// Replace a show's member list.
///
/// Recomputes every payout from the show's current financials and each
/// member's live config, then freezes the results. Prior rows are discarded
/// wholesale - a save is always a fresh computation, never an increment.
pub async fn save_show_members(
    pool: &PgPool,
    cache: &AppCache,
    show_id: Uuid,
    request: SaveShowMembersRequest,
) -> Result<SettlementResult, PayoutError> {
    let show = get_show(pool, show_id).await?;
    let financials = show_financials(pool, &show).await?;

    let mut rows = Vec::with_capacity(request.members.len());
    for entry in &request.members {
        let member = get_band_member(pool, cache, entry.band_member_id).await?;
        let config = member.payout_config();

        let input = match entry.manual_amount {
            Some(amount) => PayoutInput::ManualOverride { amount },
            None => PayoutInput::Calculated { is_referrer: entry.is_referrer },
        };
        let computed = compute_payout(&config, &input, &financials);

        rows.push(NewShowMember {
            show_id,
            band_member_id: member.id,
            name: member.name.clone(),
            role: member.role,
            payment_type: computed.payment_type,
            payment_value: computed.payment_value,
            is_referrer: entry.is_referrer,
            calculated_amount: computed.amount,
            // Freeze the config so this row survives later edits to the
            // member's live configuration
            referral_rate: config.referral_rate,
            has_min_logic: config.has_min_logic,
            min_threshold: config.min_threshold,
            min_flat_rate: config.min_flat_rate,
        });
    }

    super::queries::replace_show_members(pool, show_id, &rows).await?;
    tracing::info!(%show_id, members = rows.len(), "Show member payouts recomputed and frozen");

    settle(pool, show, financials).await
}

/// Settlement summary for the show detail page
pub async fn show_settlement(pool: &PgPool, show_id: Uuid) -> Result<SettlementResult, PayoutError> {
    let show = get_show(pool, show_id).await?;
    let financials = show_financials(pool, &show).await?;
    settle(pool, show, financials).await
}

/// Flip a show's paid flag; returns the new state
pub async fn toggle_paid(pool: &PgPool, show_id: Uuid) -> Result<bool, PayoutError> {
    let show = get_show(pool, show_id).await?;
    let is_paid = !show.is_paid;
    super::queries::set_show_paid(pool, show_id, is_paid).await?;
    Ok(is_paid)
}

/// Cancel a show: validate the refund request against what was actually
/// collected, persist the refund facts, and return the breakdown.
pub async fn cancel_show(
    pool: &PgPool,
    show_id: Uuid,
    request: CancelShowRequest,
) -> Result<RefundBreakdown, PayoutError> {
    let show = get_show(pool, show_id).await?;
    if show.status == ShowStatus::Cancelled {
        return Err(PayoutError::AlreadyCancelled { show_id });
    }

    let financials = show_financials(pool, &show).await?;
    let received = show.funds_received();
    let available = reconcile::available_for_refund(received, financials.total_expenses);

    let requested = match request.refund_type {
        RefundType::Partial => {
            let amount = request.refund_amount.ok_or(PayoutError::RefundAmountRequired)?;
            if !(0..=available).contains(&amount) {
                return Err(PayoutError::RefundOutOfRange { requested: amount, available });
            }
            amount
        }
        RefundType::NonRefundable | RefundType::Complete => 0,
    };

    let breakdown = reconcile::refund_breakdown(
        received,
        financials.total_expenses,
        request.refund_type,
        requested,
    );

    super::queries::mark_cancelled(
        pool,
        show_id,
        &request.cancellation_reason,
        request.refund_type,
        breakdown.refund_amount,
    )
    .await?;
    tracing::info!(
        %show_id,
        refund = breakdown.refund_amount,
        retained = breakdown.retained_amount,
        "Show cancelled"
    );

    Ok(breakdown)
}

/// Undo a cancellation. The refund facts are cleared and every retained-fund
/// allocation row is deleted - the retained-funds decision leaves no trace.
pub async fn restore_show(pool: &PgPool, show_id: Uuid) -> Result<ShowStatus, PayoutError> {
    let show = get_show(pool, show_id).await?;
    if show.status != ShowStatus::Cancelled {
        return Err(PayoutError::NotCancelled { show_id });
    }

    let status = show.restored_status(Utc::now());
    super::queries::restore_show(pool, show_id, status).await?;
    tracing::info!(%show_id, ?status, "Show cancellation undone");
    Ok(status)
}

/// Replace a cancelled show's retained-fund allocations.
///
/// The retained amount is recomputed from the show's persisted refund facts
/// rather than trusted from the request, so the `sum <= retained` bound is
/// enforced against database state.
pub async fn save_retained_allocations(
    pool: &PgPool,
    cache: &AppCache,
    show_id: Uuid,
    request: RetainedAllocationsRequest,
) -> Result<AllocationsResult, PayoutError> {
    let show = get_show(pool, show_id).await?;
    if show.status != ShowStatus::Cancelled {
        return Err(PayoutError::NotCancelled { show_id });
    }

    let retained_amount = retained_amount(pool, &show).await?;

    let (member_ids, strategy) = match request {
        RetainedAllocationsRequest::Assign { band_member_id } => {
            (vec![band_member_id], AllocationStrategy::Assign)
        }
        RetainedAllocationsRequest::Equal { band_member_ids } => {
            (band_member_ids, AllocationStrategy::Equal)
        }
        RetainedAllocationsRequest::Weighted { band_member_ids } => {
            (band_member_ids, AllocationStrategy::Weighted)
        }
        RetainedAllocationsRequest::Manual { allocations } => {
            let ids = allocations.iter().map(|a| a.band_member_id).collect();
            let amounts = allocations.iter().map(|a| a.amount).collect();
            (ids, AllocationStrategy::Manual(amounts))
        }
    };

    let mut members = Vec::with_capacity(member_ids.len());
    for band_member_id in member_ids {
        let member = get_band_member(pool, cache, band_member_id).await?;
        members.push(AllocationMember {
            band_member_id: member.id,
            name: member.name.clone(),
            weight: member.normal_rate,
        });
    }

    let allocations: Vec<Allocation> = allocation::allocate(retained_amount, &members, &strategy)?;
    super::queries::replace_allocations(pool, show_id, &allocations).await?;
    tracing::info!(%show_id, rows = allocations.len(), retained_amount, "Retained funds allocated");

    Ok(AllocationsResult {
        show_id,
        retained_amount,
        allocations: super::queries::get_allocations(pool, show_id).await?,
    })
}

/// Current allocations for a cancelled show
pub async fn list_retained_allocations(
    pool: &PgPool,
    show_id: Uuid,
) -> Result<AllocationsResult, PayoutError> {
    let show = get_show(pool, show_id).await?;
    if show.status != ShowStatus::Cancelled {
        return Err(PayoutError::NotCancelled { show_id });
    }
    let retained_amount = retained_amount(pool, &show).await?;

    Ok(AllocationsResult {
        show_id,
        retained_amount,
        allocations: super::queries::get_allocations(pool, show_id).await?,
    })
}

/// Pure payout preview: the same arithmetic a save performs, with nothing
/// persisted. Determinism makes "preview equals saved result" a guarantee,
/// not an estimate.
pub fn preview_payouts(request: PayoutPreviewRequest) -> PreviewResponse {
    let total_expenses: i64 = request.expenses.iter().map(|e| e.amount).sum();
    let financials = ShowFinancials {
        total_amount: request.total_amount,
        total_expenses,
    };

    let members: Vec<PreviewMemberResponse> = request
        .members
        .into_iter()
        .map(|m| {
            let config = super::calculators::PayoutConfig {
                payment_type: m.payment_type,
                normal_rate: m.normal_rate,
                referral_rate: m.referral_rate,
                has_min_logic: m.has_min_logic,
                min_threshold: m.min_threshold,
                min_flat_rate: m.min_flat_rate,
            };
            let input = match m.manual_amount {
                Some(amount) => PayoutInput::ManualOverride { amount },
                None => PayoutInput::Calculated { is_referrer: m.is_referrer },
            };
            let computed = compute_payout(&config, &input, &financials);
            PreviewMemberResponse {
                name: m.name,
                payment_type: computed.payment_type,
                payment_value: computed.payment_value,
                is_referrer: m.is_referrer,
                calculated_amount: computed.amount,
            }
        })
        .collect();

    let amounts: Vec<i64> = members.iter().map(|m| m.calculated_amount).collect();
    let reconciliation = reconcile::reconcile(request.total_amount, total_expenses, &amounts);

    PreviewResponse {
        total_amount: request.total_amount,
        total_expenses,
        reconciliation: ReconciliationResponse::from(reconciliation),
        members,
    }
}

async fn get_show(pool: &PgPool, show_id: Uuid) -> Result<Show, PayoutError> {
    super::queries::find_show(pool, show_id)
        .await?
        .ok_or(PayoutError::ShowNotFound { show_id })
}

/// Load a band member's config, trying the cache first
async fn get_band_member(
    pool: &PgPool,
    cache: &AppCache,
    band_member_id: Uuid,
) -> Result<BandMember, PayoutError> {
    if let Some(cached) = cache.members.get(&band_member_id).await {
        return Ok((*cached).clone());
    }

    let member = super::queries::find_band_member(pool, band_member_id)
        .await?
        .ok_or(PayoutError::MemberNotFound { band_member_id })?;

    cache
        .members
        .insert(band_member_id, Arc::new(member.clone()))
        .await;

    Ok(member)
}

async fn show_financials(pool: &PgPool, show: &Show) -> Result<ShowFinancials, PayoutError> {
    let expenses = super::queries::get_show_expenses(pool, show.id).await?;
    Ok(ShowFinancials {
        total_amount: show.total_amount,
        total_expenses: expenses.iter().map(|e| e.amount).sum(),
    })
}

async fn settle(
    pool: &PgPool,
    show: Show,
    financials: ShowFinancials,
) -> Result<SettlementResult, PayoutError> {
    let members = super::queries::get_show_members(pool, show.id).await?;
    let amounts: Vec<i64> = members.iter().map(|m| m.calculated_amount).collect();
    let reconciliation =
        reconcile::reconcile(financials.total_amount, financials.total_expenses, &amounts);

    Ok(SettlementResult {
        show,
        total_expenses: financials.total_expenses,
        members,
        reconciliation,
    })
}

/// Retained amount derived from the show's stored refund facts
async fn retained_amount(pool: &PgPool, show: &Show) -> Result<i64, PayoutError> {
    let expenses = super::queries::get_show_expenses(pool, show.id).await?;
    let total_expenses: i64 = expenses.iter().map(|e| e.amount).sum();
    let available = reconcile::available_for_refund(show.funds_received(), total_expenses);
    Ok(available - show.refund_amount.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payout_error_display() {
        let show_id = Uuid::nil();

        let err = PayoutError::ShowNotFound { show_id };
        assert!(err.to_string().contains("not found"));

        let err = PayoutError::RefundOutOfRange { requested: 90_000, available: 80_000 };
        assert!(err.to_string().contains("90000"));
        assert!(err.to_string().contains("80000"));

        let err = PayoutError::Allocation(AllocationError::ExceedsRetained {
            total: 60_000,
            retained: 50_000,
        });
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_preview_matches_engine_output() {
        use crate::models::PaymentType;
        use super::super::requests::{ExpenseRequest, PreviewMemberRequest};

        let request = PayoutPreviewRequest {
            total_amount: 200_000,
            expenses: vec![
                ExpenseRequest { description: "Travel".to_string(), amount: 12_000 },
                ExpenseRequest { description: "Sound".to_string(), amount: 8000 },
            ],
            members: vec![
                PreviewMemberRequest {
                    name: "Ravi".to_string(),
                    payment_type: PaymentType::Percentage,
                    normal_rate: dec!(15),
                    referral_rate: Some(dec!(33)),
                    has_min_logic: true,
                    min_threshold: Some(100_000),
                    min_flat_rate: Some(15_000),
                    is_referrer: false,
                    manual_amount: None,
                },
                PreviewMemberRequest {
                    name: "Anya".to_string(),
                    payment_type: PaymentType::Fixed,
                    normal_rate: dec!(5000),
                    referral_rate: None,
                    has_min_logic: false,
                    min_threshold: None,
                    min_flat_rate: None,
                    is_referrer: false,
                    manual_amount: None,
                },
            ],
        };

        let preview = preview_payouts(request);
        assert_eq!(preview.total_expenses, 20_000);
        assert_eq!(preview.reconciliation.net_amount, 180_000);
        assert_eq!(preview.members[0].calculated_amount, 27_000);
        assert_eq!(preview.members[1].calculated_amount, 5000);
        assert_eq!(preview.reconciliation.total_member_payouts, 32_000);
        assert_eq!(preview.reconciliation.admin_residual, 148_000);
        // Identity: total = expenses + payouts + residual
        assert_eq!(
            preview.total_amount,
            preview.total_expenses
                + preview.reconciliation.total_member_payouts
                + preview.reconciliation.admin_residual
        );
    }
}
