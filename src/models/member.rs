//! Band member models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::payout::calculators::PayoutConfig;

use super::show::ShowStatus;

/// How a member is paid for a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Flat rupee amount per show
    Fixed,
    /// Percent of the show's net amount
    Percentage,
}

/// Member's role in the band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    SessionPlayer,
    Manager,
    Other,
}

/// Band member from band_members (live payment configuration)
#[derive(Debug, Clone, FromRow)]
pub struct BandMember {
    pub id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub payment_type: PaymentType,
    pub normal_rate: Decimal,
    pub referral_rate: Option<Decimal>,
    pub has_min_logic: bool,
    pub min_threshold: Option<i64>,
    pub min_flat_rate: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl BandMember {
    /// Snapshot the member's current payment policy for freezing into a
    /// show_members row. Frozen copies never change once saved.
    pub fn payout_config(&self) -> PayoutConfig {
        PayoutConfig {
            payment_type: self.payment_type,
            normal_rate: self.normal_rate,
            referral_rate: self.referral_rate,
            has_min_logic: self.has_min_logic,
            min_threshold: self.min_threshold,
            min_flat_rate: self.min_flat_rate,
        }
    }
}

/// One frozen earning row for the member earnings view (joined with shows)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberShowEarning {
    pub show_id: Uuid,
    pub show_name: String,
    pub show_date: DateTime<Utc>,
    pub status: ShowStatus,
    pub payment_type: PaymentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub payment_value: Decimal,
    pub is_referrer: bool,
    pub calculated_amount: i64,
}
