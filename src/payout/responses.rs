//! Response DTOs for payout API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    MemberRole, MemberShowEarning, PaymentType, RetainedFundAllocation, ShowMember, ShowStatus,
};

use super::reconcile::{Reconciliation, RefundBreakdown};

/// One frozen payout row for JSON responses
#[derive(Debug, Serialize)]
pub struct ShowMemberResponse {
    pub band_member_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub payment_type: PaymentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub payment_value: Decimal,
    pub is_referrer: bool,
    pub calculated_amount: i64,
}

impl From<ShowMember> for ShowMemberResponse {
    fn from(row: ShowMember) -> Self {
        Self {
            band_member_id: row.band_member_id,
            name: row.name,
            role: row.role,
            payment_type: row.payment_type,
            payment_value: row.payment_value,
            is_referrer: row.is_referrer,
            calculated_amount: row.calculated_amount,
        }
    }
}

/// Derived settlement figures for JSON responses
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub net_amount: i64,
    pub total_member_payouts: i64,
    pub admin_residual: i64,
}

impl From<Reconciliation> for ReconciliationResponse {
    fn from(r: Reconciliation) -> Self {
        Self {
            net_amount: r.net_amount,
            total_member_payouts: r.total_member_payouts,
            admin_residual: r.admin_residual,
        }
    }
}

/// Response for the show settlement view and member-list saves
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub show_id: Uuid,
    pub status: ShowStatus,
    pub is_paid: bool,
    pub total_amount: i64,
    pub total_expenses: i64,
    #[serde(flatten)]
    pub reconciliation: ReconciliationResponse,
    pub members: Vec<ShowMemberResponse>,
}

/// Response for toggling a show's paid flag
#[derive(Debug, Serialize)]
pub struct PaidToggleResponse {
    pub show_id: Uuid,
    pub is_paid: bool,
}

/// Refund accounting in JSON responses
#[derive(Debug, Serialize)]
pub struct RefundBreakdownResponse {
    pub funds_received: i64,
    pub available_for_refund: i64,
    pub refund_amount: i64,
    pub retained_amount: i64,
}

impl From<RefundBreakdown> for RefundBreakdownResponse {
    fn from(b: RefundBreakdown) -> Self {
        Self {
            funds_received: b.funds_received,
            available_for_refund: b.available_for_refund,
            refund_amount: b.refund_amount,
            retained_amount: b.retained_amount,
        }
    }
}

/// Response after cancelling a show
#[derive(Debug, Serialize)]
pub struct CancelShowResponse {
    pub show_id: Uuid,
    pub status: ShowStatus,
    #[serde(flatten)]
    pub breakdown: RefundBreakdownResponse,
}

/// Response after restoring a cancelled show
#[derive(Debug, Serialize)]
pub struct RestoreShowResponse {
    pub show_id: Uuid,
    pub status: ShowStatus,
}

/// One retained-fund allocation row for JSON responses
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub band_member_id: Uuid,
    pub member_name: String,
    pub amount: i64,
}

impl From<RetainedFundAllocation> for AllocationResponse {
    fn from(row: RetainedFundAllocation) -> Self {
        Self {
            band_member_id: row.band_member_id,
            member_name: row.member_name,
            amount: row.amount,
        }
    }
}

/// Response for saving or listing retained-fund allocations
#[derive(Debug, Serialize)]
pub struct AllocationsResponse {
    pub show_id: Uuid,
    pub retained_amount: i64,
    pub allocations: Vec<AllocationResponse>,
}

/// One previewed (unsaved) member payout
#[derive(Debug, Serialize)]
pub struct PreviewMemberResponse {
    pub name: String,
    pub payment_type: PaymentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub payment_value: Decimal,
    pub is_referrer: bool,
    pub calculated_amount: i64,
}

/// Response for a payout preview
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub total_amount: i64,
    pub total_expenses: i64,
    #[serde(flatten)]
    pub reconciliation: ReconciliationResponse,
    pub members: Vec<PreviewMemberResponse>,
}

/// Response for the member earnings view
#[derive(Debug, Serialize)]
pub struct MemberEarningsResponse {
    pub band_member_id: Uuid,
    pub name: String,
    pub total_earned: i64,
    pub shows: Vec<MemberShowEarning>,
}
