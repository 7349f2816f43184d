//! Show settlement and cancellation arithmetic.
//!
//! Pure functions tying member payouts back to the show's money. The admin's
//! residual is always a derived remainder, never an input, so the identity
//! `total = expenses + member payouts + residual` holds by construction.

use crate::models::RefundType;

/// Derived settlement figures for one show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub net_amount: i64,
    pub total_member_payouts: i64,
    /// What is left for the admin after expenses and member payouts.
    /// Negative when payouts over-commit the show; surfaced as-is.
    pub admin_residual: i64,
}

/// Reconcile a show's total against its expenses and member payouts.
pub fn reconcile(total_amount: i64, total_expenses: i64, member_amounts: &[i64]) -> Reconciliation {
    let net_amount = total_amount - total_expenses;
    let total_member_payouts: i64 = member_amounts.iter().sum();
    Reconciliation {
        net_amount,
        total_member_payouts,
        admin_residual: net_amount - total_member_payouts,
    }
}

/// Money actually collected: the full contracted amount once the show is
/// paid, otherwise only the advance. Only collected funds enter refund
/// accounting.
pub fn funds_received(total_amount: i64, advance_payment: i64, is_paid: bool) -> i64 {
    if is_paid {
        total_amount
    } else {
        advance_payment
    }
}

/// Portion of collected funds still refundable after expenses. Expenses are
/// deducted first; a show that consumed its advance has nothing to refund.
pub fn available_for_refund(funds_received: i64, total_expenses: i64) -> i64 {
    (funds_received - total_expenses).max(0)
}

/// Refund accounting for a cancelled show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundBreakdown {
    pub funds_received: i64,
    pub available_for_refund: i64,
    pub refund_amount: i64,
    /// Kept by the band; optionally distributed to members afterwards
    pub retained_amount: i64,
}

/// Split collected funds into refunded and retained portions.
///
/// `requested_refund` is only consulted for `Partial`; bounds
/// (`0 <= requested <= available`) are the caller's responsibility, validated
/// at the service boundary.
pub fn refund_breakdown(
    funds_received: i64,
    total_expenses: i64,
    refund_type: RefundType,
    requested_refund: i64,
) -> RefundBreakdown {
    let available = available_for_refund(funds_received, total_expenses);
    let refund_amount = match refund_type {
        RefundType::NonRefundable => 0,
        RefundType::Complete => available,
        RefundType::Partial => requested_refund,
    };
    RefundBreakdown {
        funds_received,
        available_for_refund: available,
        refund_amount,
        retained_amount: available - refund_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_identity(total: i64, expenses: i64, payouts: &[i64]) {
        let r = reconcile(total, expenses, payouts);
        assert_eq!(total, expenses + r.total_member_payouts + r.admin_residual);
    }

    // ==================== reconcile tests ====================

    #[test]
    fn test_reconcile_basic() {
        let r = reconcile(200_000, 20_000, &[27_000, 59_400, 5000]);
        assert_eq!(r.net_amount, 180_000);
        assert_eq!(r.total_member_payouts, 91_400);
        assert_eq!(r.admin_residual, 88_600);
    }

    #[test]
    fn test_reconcile_identity_holds() {
        assert_identity(200_000, 20_000, &[27_000, 59_400]);
        assert_identity(0, 0, &[]);
        assert_identity(80_000, 120_000, &[13_500, -3000]);
        assert_identity(100_000, 0, &[100_000, 100_000]);
    }

    #[test]
    fn test_reconcile_negative_residual_permitted() {
        // Payouts over-commit the show
        let r = reconcile(50_000, 10_000, &[30_000, 30_000]);
        assert_eq!(r.admin_residual, -20_000);
    }

    #[test]
    fn test_reconcile_negative_net() {
        let r = reconcile(10_000, 30_000, &[]);
        assert_eq!(r.net_amount, -20_000);
        assert_eq!(r.admin_residual, -20_000);
    }

    // ==================== funds_received tests ====================

    #[test]
    fn test_funds_received() {
        assert_eq!(funds_received(100_000, 25_000, true), 100_000);
        assert_eq!(funds_received(100_000, 25_000, false), 25_000);
        assert_eq!(funds_received(100_000, 0, false), 0);
    }

    // ==================== refund tests ====================

    #[test]
    fn test_refund_partial() {
        // Paid in full 100000, expenses 20000 -> available 80000;
        // partial refund 30000 -> retained 50000
        let b = refund_breakdown(100_000, 20_000, RefundType::Partial, 30_000);
        assert_eq!(b.available_for_refund, 80_000);
        assert_eq!(b.refund_amount, 30_000);
        assert_eq!(b.retained_amount, 50_000);
    }

    #[test]
    fn test_refund_complete() {
        let b = refund_breakdown(100_000, 20_000, RefundType::Complete, 0);
        assert_eq!(b.refund_amount, 80_000);
        assert_eq!(b.retained_amount, 0);
    }

    #[test]
    fn test_refund_non_refundable() {
        let b = refund_breakdown(100_000, 20_000, RefundType::NonRefundable, 99_999);
        assert_eq!(b.refund_amount, 0);
        assert_eq!(b.retained_amount, 80_000);
    }

    #[test]
    fn test_refund_expenses_consume_advance() {
        // Advance fully eaten by expenses: nothing to refund or retain
        let b = refund_breakdown(25_000, 40_000, RefundType::Complete, 0);
        assert_eq!(b.available_for_refund, 0);
        assert_eq!(b.refund_amount, 0);
        assert_eq!(b.retained_amount, 0);
    }
}
