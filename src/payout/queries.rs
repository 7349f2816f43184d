//! Database queries used by the payout services.
//!
//! These return raw sqlx results; the service layer translates them into
//! domain errors.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    BandMember, NewShowMember, RefundType, RetainedFundAllocation, Show, ShowExpense, ShowMember,
    ShowStatus,
};

use super::allocation::Allocation;

/// Fetch a show by id
pub async fn find_show(pool: &PgPool, show_id: Uuid) -> Result<Option<Show>, sqlx::Error> {
    sqlx::query_as::<_, Show>(
        r#"
        SELECT
            id, name, venue, show_date, status,
            total_amount, advance_payment, is_paid,
            cancellation_reason, refund_type, refund_amount,
            created_at
        FROM shows
        WHERE id = $1
        "#,
    )
    .bind(show_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a show's expense lines in display order
pub async fn get_show_expenses(
    pool: &PgPool,
    show_id: Uuid,
) -> Result<Vec<ShowExpense>, sqlx::Error> {
    sqlx::query_as::<_, ShowExpense>(
        r#"
        SELECT id, show_id, description, amount, position
        FROM show_expenses
        WHERE show_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(show_id)
    .fetch_all(pool)
    .await
}

/// Fetch a band member's live config
pub async fn find_band_member(
    pool: &PgPool,
    band_member_id: Uuid,
) -> Result<Option<BandMember>, sqlx::Error> {
    sqlx::query_as::<_, BandMember>(
        r#"
        SELECT
            id, name, role, payment_type, normal_rate, referral_rate,
            has_min_logic, min_threshold, min_flat_rate, is_active, created_at
        FROM band_members
        WHERE id = $1
        "#,
    )
    .bind(band_member_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a show's frozen payout rows
pub async fn get_show_members(
    pool: &PgPool,
    show_id: Uuid,
) -> Result<Vec<ShowMember>, sqlx::Error> {
    sqlx::query_as::<_, ShowMember>(
        r#"
        SELECT
            id, show_id, band_member_id, name, role,
            payment_type, payment_value, is_referrer, calculated_amount,
            referral_rate, has_min_logic, min_threshold, min_flat_rate
        FROM show_members
        WHERE show_id = $1
        ORDER BY name, id
        "#,
    )
    .bind(show_id)
    .fetch_all(pool)
    .await
}

/// Replace a show's frozen payout rows: delete all prior rows, then insert
/// the new set in one transaction. There is no partial-update path.
pub async fn replace_show_members(
    pool: &PgPool,
    show_id: Uuid,
    rows: &[NewShowMember],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM show_members WHERE show_id = $1")
        .bind(show_id)
        .execute(&mut *tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO show_members (
                show_id, band_member_id, name, role,
                payment_type, payment_value, is_referrer, calculated_amount,
                referral_rate, has_min_logic, min_threshold, min_flat_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.show_id)
        .bind(row.band_member_id)
        .bind(&row.name)
        .bind(row.role)
        .bind(row.payment_type)
        .bind(row.payment_value)
        .bind(row.is_referrer)
        .bind(row.calculated_amount)
        .bind(row.referral_rate)
        .bind(row.has_min_logic)
        .bind(row.min_threshold)
        .bind(row.min_flat_rate)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Set a show's paid flag
pub async fn set_show_paid(
    pool: &PgPool,
    show_id: Uuid,
    is_paid: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE shows SET is_paid = $2 WHERE id = $1")
        .bind(show_id)
        .bind(is_paid)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark a show cancelled with its refund facts
pub async fn mark_cancelled(
    pool: &PgPool,
    show_id: Uuid,
    cancellation_reason: &str,
    refund_type: RefundType,
    refund_amount: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE shows
        SET status = 'cancelled',
            cancellation_reason = $2,
            refund_type = $3,
            refund_amount = $4
        WHERE id = $1
        "#,
    )
    .bind(show_id)
    .bind(cancellation_reason)
    .bind(refund_type)
    .bind(refund_amount)
    .execute(pool)
    .await?;
    Ok(())
}

/// Undo a cancellation: clear the refund facts and drop any retained-fund
/// allocations, in one transaction.
pub async fn restore_show(
    pool: &PgPool,
    show_id: Uuid,
    status: ShowStatus,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE shows
        SET status = $2,
            cancellation_reason = NULL,
            refund_type = NULL,
            refund_amount = NULL
        WHERE id = $1
        "#,
    )
    .bind(show_id)
    .bind(status)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM retained_fund_allocations WHERE show_id = $1")
        .bind(show_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Fetch a show's retained-fund allocations
pub async fn get_allocations(
    pool: &PgPool,
    show_id: Uuid,
) -> Result<Vec<RetainedFundAllocation>, sqlx::Error> {
    sqlx::query_as::<_, RetainedFundAllocation>(
        r#"
        SELECT id, show_id, band_member_id, member_name, amount
        FROM retained_fund_allocations
        WHERE show_id = $1
        ORDER BY member_name, id
        "#,
    )
    .bind(show_id)
    .fetch_all(pool)
    .await
}

/// Replace a show's retained-fund allocations: delete-then-insert in one
/// transaction.
pub async fn replace_allocations(
    pool: &PgPool,
    show_id: Uuid,
    allocations: &[Allocation],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM retained_fund_allocations WHERE show_id = $1")
        .bind(show_id)
        .execute(&mut *tx)
        .await?;

    for allocation in allocations {
        sqlx::query(
            r#"
            INSERT INTO retained_fund_allocations (show_id, band_member_id, member_name, amount)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(show_id)
        .bind(allocation.band_member_id)
        .bind(&allocation.member_name)
        .bind(allocation.amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
