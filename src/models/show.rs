//! Show and payout-record models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::payout::reconcile;

use super::member::{MemberRole, PaymentType};

/// Show lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "show_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    Upcoming,
    Completed,
    Cancelled,
}

/// Refund mode chosen when a show is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "refund_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    NonRefundable,
    Partial,
    Complete,
}

/// Show from shows
#[derive(Debug, Clone, FromRow)]
pub struct Show {
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub show_date: DateTime<Utc>,
    pub status: ShowStatus,
    pub total_amount: i64,
    pub advance_payment: i64,
    pub is_paid: bool,
    pub cancellation_reason: Option<String>,
    pub refund_type: Option<RefundType>,
    pub refund_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Show {
    /// Money actually collected for this show: the full amount once paid,
    /// otherwise only the advance. Refund accounting starts from this figure.
    pub fn funds_received(&self) -> i64 {
        reconcile::funds_received(self.total_amount, self.advance_payment, self.is_paid)
    }

    /// Status a cancelled show returns to when the cancellation is undone.
    pub fn restored_status(&self, now: DateTime<Utc>) -> ShowStatus {
        if self.show_date > now {
            ShowStatus::Upcoming
        } else {
            ShowStatus::Completed
        }
    }
}

/// Expense line from show_expenses
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowExpense {
    pub id: Uuid,
    pub show_id: Uuid,
    pub description: String,
    pub amount: i64,
    pub position: i32,
}

/// Frozen payout record from show_members.
///
/// Carries its own copy of the payment-config fields so historical payouts
/// stay stable even if the member's live config changes later.
#[derive(Debug, Clone, FromRow)]
pub struct ShowMember {
    pub id: Uuid,
    pub show_id: Uuid,
    pub band_member_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub payment_type: PaymentType,
    pub payment_value: Decimal,
    pub is_referrer: bool,
    pub calculated_amount: i64,
    pub referral_rate: Option<Decimal>,
    pub has_min_logic: bool,
    pub min_threshold: Option<i64>,
    pub min_flat_rate: Option<i64>,
}

/// Insert shape for a show_members row (id assigned by the database)
#[derive(Debug, Clone)]
pub struct NewShowMember {
    pub show_id: Uuid,
    pub band_member_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub payment_type: PaymentType,
    pub payment_value: Decimal,
    pub is_referrer: bool,
    pub calculated_amount: i64,
    pub referral_rate: Option<Decimal>,
    pub has_min_logic: bool,
    pub min_threshold: Option<i64>,
    pub min_flat_rate: Option<i64>,
}

/// Retained-funds distribution row from retained_fund_allocations
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RetainedFundAllocation {
    pub id: Uuid,
    pub show_id: Uuid,
    pub band_member_id: Uuid,
    pub member_name: String,
    pub amount: i64,
}
