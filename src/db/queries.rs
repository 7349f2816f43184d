//! Database queries for band members and the member earnings view

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BandMember, MemberShowEarning};

/// Get a band member by id
pub async fn get_band_member(pool: &PgPool, band_member_id: Uuid) -> Result<BandMember> {
    let member = sqlx::query_as::<_, BandMember>(
        r#"
        SELECT
            id,
            name,
            role,
            payment_type,
            normal_rate,
            referral_rate,
            has_min_logic,
            min_threshold,
            min_flat_rate,
            is_active,
            created_at
        FROM band_members
        WHERE id = $1
        "#,
    )
    .bind(band_member_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(member)
}

/// Get all active band members (for cache warming)
pub async fn get_active_band_members(pool: &PgPool) -> Result<Vec<BandMember>> {
    let members = sqlx::query_as::<_, BandMember>(
        r#"
        SELECT
            id,
            name,
            role,
            payment_type,
            normal_rate,
            referral_rate,
            has_min_logic,
            min_threshold,
            min_flat_rate,
            is_active,
            created_at
        FROM band_members
        WHERE is_active = true
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(members)
}

/// Get a member's frozen payouts joined with their shows, newest first
pub async fn get_member_show_earnings(
    pool: &PgPool,
    band_member_id: Uuid,
) -> Result<Vec<MemberShowEarning>> {
    let earnings = sqlx::query_as::<_, MemberShowEarning>(
        r#"
        SELECT
            s.id AS show_id,
            s.name AS show_name,
            s.show_date,
            s.status,
            sm.payment_type,
            sm.payment_value,
            sm.is_referrer,
            sm.calculated_amount
        FROM show_members sm
        JOIN shows s ON s.id = sm.show_id
        WHERE sm.band_member_id = $1
        ORDER BY s.show_date DESC
        "#,
    )
    .bind(band_member_id)
    .fetch_all(pool)
    .await?;

    Ok(earnings)
}
