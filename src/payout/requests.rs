//! Request DTOs for payout API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{PaymentType, RefundType};

/// Request to replace a show's member list
#[derive(Debug, Deserialize)]
pub struct SaveShowMembersRequest {
    pub members: Vec<ShowMemberEntryRequest>,
}

/// One member entry in a save-show-members request
#[derive(Debug, Deserialize)]
pub struct ShowMemberEntryRequest {
    pub band_member_id: Uuid,
    #[serde(default)]
    pub is_referrer: bool,
    /// Admin-entered custom amount ("Custom amount" checkbox); replaces the
    /// computed payout entirely
    #[serde(default)]
    pub manual_amount: Option<i64>,
}

/// Request to cancel a show
#[derive(Debug, Deserialize)]
pub struct CancelShowRequest {
    pub cancellation_reason: String,
    pub refund_type: RefundType,
    /// Required for `partial`, ignored otherwise
    #[serde(default)]
    pub refund_amount: Option<i64>,
}

/// Request to replace a cancelled show's retained-fund allocations
#[derive(Debug, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RetainedAllocationsRequest {
    /// Full retained amount to one member
    Assign { band_member_id: Uuid },
    /// Even split over the selected members, in selection order
    Equal { band_member_ids: Vec<Uuid> },
    /// Split weighted by each member's normal rate
    Weighted { band_member_ids: Vec<Uuid> },
    /// Caller-chosen amounts
    Manual { allocations: Vec<ManualAllocationRequest> },
}

/// One manual allocation entry
#[derive(Debug, Deserialize)]
pub struct ManualAllocationRequest {
    pub band_member_id: Uuid,
    pub amount: i64,
}

/// Request for a payout preview (no persistence; the UI calls this so the
/// admin sees the exact numbers a save would freeze)
#[derive(Debug, Deserialize)]
pub struct PayoutPreviewRequest {
    pub total_amount: i64,
    #[serde(default)]
    pub expenses: Vec<ExpenseRequest>,
    pub members: Vec<PreviewMemberRequest>,
}

/// An expense line in a preview request
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub description: String,
    pub amount: i64,
}

/// One member's config + flags in a preview request
#[derive(Debug, Deserialize)]
pub struct PreviewMemberRequest {
    pub name: String,
    pub payment_type: PaymentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub normal_rate: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub referral_rate: Option<Decimal>,
    #[serde(default)]
    pub has_min_logic: bool,
    #[serde(default)]
    pub min_threshold: Option<i64>,
    #[serde(default)]
    pub min_flat_rate: Option<i64>,
    #[serde(default)]
    pub is_referrer: bool,
    #[serde(default)]
    pub manual_amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_request_strategies_deserialize() {
        let assign: RetainedAllocationsRequest = serde_json::from_str(
            r#"{"strategy": "assign", "band_member_id": "550e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .unwrap();
        assert!(matches!(assign, RetainedAllocationsRequest::Assign { .. }));

        let manual: RetainedAllocationsRequest = serde_json::from_str(
            r#"{"strategy": "manual", "allocations": [
                {"band_member_id": "550e8400-e29b-41d4-a716-446655440000", "amount": 5000}
            ]}"#,
        )
        .unwrap();
        match manual {
            RetainedAllocationsRequest::Manual { allocations } => {
                assert_eq!(allocations.len(), 1);
                assert_eq!(allocations[0].amount, 5000);
            }
            other => panic!("expected manual, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_member_defaults() {
        let member: PreviewMemberRequest = serde_json::from_str(
            r#"{"name": "Ravi", "payment_type": "percentage", "normal_rate": "15"}"#,
        )
        .unwrap();
        assert!(!member.is_referrer);
        assert!(!member.has_min_logic);
        assert!(member.referral_rate.is_none());
        assert!(member.manual_amount.is_none());
    }
}
