//! Core payout calculation functions.
//!
//! Pure functions for payout math - no database access. The same numbers the
//! admin previews in the UI are frozen at save time, so everything here must
//! be deterministic on its inputs alone.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::models::PaymentType;

/// Round to the nearest whole rupee, halves away from zero (ROUND_HALF_UP).
///
/// There are no currency subunits in this domain - every percentage-derived
/// amount lands on an integer rupee.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use bandroom_web::payout::round_rupees;
///
/// assert_eq!(round_rupees(dec!(2.5)), 3);
/// assert_eq!(round_rupees(dec!(2.4)), 2);
/// assert_eq!(round_rupees(dec!(-2.5)), -3);
/// ```
pub fn round_rupees(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// A member's payment policy at calculation time.
///
/// Either the live band-member config or a frozen per-show snapshot. The
/// referral/min-threshold fields only carry meaning for `Percentage`; they are
/// ignored for `Fixed`.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutConfig {
    pub payment_type: PaymentType,
    /// Rupee amount if `Fixed`, percent (0-100) if `Percentage`
    pub normal_rate: Decimal,
    /// Percent used instead of `normal_rate` when the member referred the show
    pub referral_rate: Option<Decimal>,
    /// Whether the minimum-threshold flat-rate fallback applies
    pub has_min_logic: bool,
    /// Show total below which the fallback activates (strict `<`)
    pub min_threshold: Option<i64>,
    /// Base rupee amount paid under the fallback, before expense deduction
    pub min_flat_rate: Option<i64>,
}

impl PayoutConfig {
    /// Rate the calculation uses: the referral rate for referrers (falling
    /// back to the normal rate when none is configured), otherwise the
    /// normal rate.
    pub fn effective_rate(&self, is_referrer: bool) -> Decimal {
        if is_referrer {
            self.referral_rate.unwrap_or(self.normal_rate)
        } else {
            self.normal_rate
        }
    }
}

/// Per-show financial facts at calculation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowFinancials {
    pub total_amount: i64,
    pub total_expenses: i64,
}

impl ShowFinancials {
    /// Net amount after expenses. Not clamped - expenses can exceed the total.
    pub fn net_amount(&self) -> i64 {
        self.total_amount - self.total_expenses
    }
}

/// How a member's payout is determined for a show.
///
/// The manual override is its own variant rather than a mutated type field,
/// so an overridden row is structurally distinguishable from a genuinely
/// fixed-rate member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutInput {
    /// Compute from the member's config
    Calculated { is_referrer: bool },
    /// Admin-entered custom amount; replaces the computed result entirely
    ManualOverride { amount: i64 },
}

/// Result of a payout calculation, ready to freeze into a show_members row
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPayout {
    pub amount: i64,
    /// Type recorded on the frozen row (`Fixed` for manual overrides)
    pub payment_type: PaymentType,
    /// Rate actually used: rupees for fixed, percent for percentage
    pub payment_value: Decimal,
}

/// Compute one member's payout for a show.
///
/// Branch order matters - later rules override earlier ones:
/// 1. Manual override: the supplied amount verbatim, recorded as `Fixed`.
/// 2. Fixed type: the configured rupee amount; expenses and referral status
///    are irrelevant.
/// 3. Percentage, referrer: `round(net * referral_rate / 100)`. The
///    min-threshold fallback never applies to referrers.
/// 4. Percentage, below threshold (`has_min_logic`, threshold set, and
///    `total < threshold` strictly): `min_flat_rate - round(rate% of total
///    expenses)`. Deliberately not floored at zero.
/// 5. Percentage, standard: `round(net * rate / 100)`.
///
/// Pure arithmetic - no validation, no errors. Shape checks (e.g. a
/// percentage config missing its threshold) belong to the boundary; a missing
/// threshold simply skips the fallback branch.
pub fn compute_payout(
    config: &PayoutConfig,
    input: &PayoutInput,
    financials: &ShowFinancials,
) -> ComputedPayout {
    let is_referrer = match *input {
        PayoutInput::ManualOverride { amount } => {
            return ComputedPayout {
                amount,
                payment_type: PaymentType::Fixed,
                payment_value: Decimal::from(amount),
            };
        }
        PayoutInput::Calculated { is_referrer } => is_referrer,
    };

    match config.payment_type {
        PaymentType::Fixed => ComputedPayout {
            amount: round_rupees(config.normal_rate),
            payment_type: PaymentType::Fixed,
            payment_value: config.normal_rate,
        },
        PaymentType::Percentage => {
            let rate = config.effective_rate(is_referrer);
            let net = Decimal::from(financials.net_amount());

            let amount = if !is_referrer && below_min_threshold(config, financials.total_amount) {
                // Flat-rate floor minus the member's normal-rate share of
                // total expenses (not net), so a below-threshold show still
                // shares some expense burden. Can go negative.
                config.min_flat_rate.unwrap_or(0)
                    - round_rupees(
                        rate / Decimal::ONE_HUNDRED * Decimal::from(financials.total_expenses),
                    )
            } else {
                round_rupees(net * rate / Decimal::ONE_HUNDRED)
            };

            ComputedPayout {
                amount,
                payment_type: PaymentType::Percentage,
                payment_value: rate,
            }
        }
    }
}

fn below_min_threshold(config: &PayoutConfig, total_amount: i64) -> bool {
    config.has_min_logic
        && config
            .min_threshold
            .is_some_and(|threshold| total_amount < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn percentage_config() -> PayoutConfig {
        PayoutConfig {
            payment_type: PaymentType::Percentage,
            normal_rate: dec!(15),
            referral_rate: Some(dec!(33)),
            has_min_logic: true,
            min_threshold: Some(100_000),
            min_flat_rate: Some(15_000),
        }
    }

    fn calculated(is_referrer: bool) -> PayoutInput {
        PayoutInput::Calculated { is_referrer }
    }

    // ==================== round_rupees tests ====================

    #[test]
    fn test_round_rupees_half_up() {
        assert_eq!(round_rupees(dec!(2.5)), 3);
        assert_eq!(round_rupees(dec!(3.5)), 4);
        assert_eq!(round_rupees(dec!(2.4)), 2);
        assert_eq!(round_rupees(dec!(2.6)), 3);
    }

    #[test]
    fn test_round_rupees_negative() {
        // Halves move away from zero in both directions
        assert_eq!(round_rupees(dec!(-2.5)), -3);
        assert_eq!(round_rupees(dec!(-2.4)), -2);
    }

    #[test]
    fn test_round_rupees_whole() {
        assert_eq!(round_rupees(dec!(0)), 0);
        assert_eq!(round_rupees(dec!(27000)), 27_000);
    }

    // ==================== fixed type ====================

    #[test]
    fn test_fixed_ignores_show_financials() {
        let config = PayoutConfig {
            payment_type: PaymentType::Fixed,
            normal_rate: dec!(5000),
            referral_rate: Some(dec!(33)),
            has_min_logic: true,
            min_threshold: Some(100_000),
            min_flat_rate: Some(15_000),
        };

        for financials in [
            ShowFinancials { total_amount: 0, total_expenses: 0 },
            ShowFinancials { total_amount: 80_000, total_expenses: 10_000 },
            ShowFinancials { total_amount: 1_000_000, total_expenses: 999_999 },
        ] {
            for is_referrer in [false, true] {
                let result = compute_payout(&config, &calculated(is_referrer), &financials);
                assert_eq!(result.amount, 5000);
                assert_eq!(result.payment_type, PaymentType::Fixed);
                assert_eq!(result.payment_value, dec!(5000));
            }
        }
    }

    // ==================== percentage: standard ====================

    #[test]
    fn test_percentage_standard() {
        // 15% of net 180000 = 27000
        let financials = ShowFinancials { total_amount: 200_000, total_expenses: 20_000 };
        let result = compute_payout(&percentage_config(), &calculated(false), &financials);
        assert_eq!(result.amount, 27_000);
        assert_eq!(result.payment_value, dec!(15));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 15% of net 99997 = 14999.55 -> 15000
        let config = PayoutConfig { has_min_logic: false, ..percentage_config() };
        let financials = ShowFinancials { total_amount: 99_997, total_expenses: 0 };
        let result = compute_payout(&config, &calculated(false), &financials);
        assert_eq!(result.amount, 15_000);
    }

    #[test]
    fn test_percentage_negative_net_not_clamped() {
        let config = PayoutConfig { has_min_logic: false, ..percentage_config() };
        let financials = ShowFinancials { total_amount: 10_000, total_expenses: 30_000 };
        let result = compute_payout(&config, &calculated(false), &financials);
        // 15% of -20000
        assert_eq!(result.amount, -3000);
    }

    // ==================== percentage: referral ====================

    #[test]
    fn test_referral_overrides_normal_rate() {
        // 33% of net 180000 = 59400, independent of the 15% normal rate
        let financials = ShowFinancials { total_amount: 200_000, total_expenses: 20_000 };
        let result = compute_payout(&percentage_config(), &calculated(true), &financials);
        assert_eq!(result.amount, 59_400);
        assert_eq!(result.payment_value, dec!(33));
    }

    #[test]
    fn test_referral_skips_min_threshold_fallback() {
        // Below threshold, but referrers always take the percentage path:
        // 33% of net 70000 = 23100
        let financials = ShowFinancials { total_amount: 80_000, total_expenses: 10_000 };
        let result = compute_payout(&percentage_config(), &calculated(true), &financials);
        assert_eq!(result.amount, 23_100);
    }

    #[test]
    fn test_referral_without_configured_rate_uses_normal() {
        let config = PayoutConfig { referral_rate: None, has_min_logic: false, ..percentage_config() };
        let financials = ShowFinancials { total_amount: 200_000, total_expenses: 20_000 };
        let result = compute_payout(&config, &calculated(true), &financials);
        assert_eq!(result.amount, 27_000);
        assert_eq!(result.payment_value, dec!(15));
    }

    // ==================== percentage: min-threshold fallback ====================

    #[test]
    fn test_min_threshold_fallback() {
        // 80000 < 100000 -> 15000 - round(15% of 10000) = 13500
        let financials = ShowFinancials { total_amount: 80_000, total_expenses: 10_000 };
        let result = compute_payout(&percentage_config(), &calculated(false), &financials);
        assert_eq!(result.amount, 13_500);
        assert_eq!(result.payment_type, PaymentType::Percentage);
        assert_eq!(result.payment_value, dec!(15));
    }

    #[test]
    fn test_min_threshold_boundary_is_strict() {
        // Flat rate chosen so fallback and standard results differ at the edge
        let config = PayoutConfig { min_flat_rate: Some(20_000), ..percentage_config() };

        // 99999 < 100000 -> fallback: 20000 - round(15% of 10000) = 18500
        let below = ShowFinancials { total_amount: 99_999, total_expenses: 10_000 };
        let result = compute_payout(&config, &calculated(false), &below);
        assert_eq!(result.amount, 18_500);

        // 100000 is NOT below 100000 -> standard case: 15% of 90000 = 13500
        let at = ShowFinancials { total_amount: 100_000, total_expenses: 10_000 };
        let result = compute_payout(&config, &calculated(false), &at);
        assert_eq!(result.amount, 13_500);
    }

    #[test]
    fn test_min_threshold_fallback_can_go_negative() {
        // 15000 - round(15% of 120000) = 15000 - 18000 = -3000
        let financials = ShowFinancials { total_amount: 80_000, total_expenses: 120_000 };
        let result = compute_payout(&percentage_config(), &calculated(false), &financials);
        assert_eq!(result.amount, -3000);
    }

    #[test]
    fn test_min_logic_without_threshold_skips_fallback() {
        let config = PayoutConfig { min_threshold: None, ..percentage_config() };
        let financials = ShowFinancials { total_amount: 80_000, total_expenses: 10_000 };
        let result = compute_payout(&config, &calculated(false), &financials);
        // standard case: 15% of 70000
        assert_eq!(result.amount, 10_500);
    }

    #[test]
    fn test_fallback_without_flat_rate_is_pure_deduction() {
        let config = PayoutConfig { min_flat_rate: None, ..percentage_config() };
        let financials = ShowFinancials { total_amount: 80_000, total_expenses: 10_000 };
        let result = compute_payout(&config, &calculated(false), &financials);
        assert_eq!(result.amount, -1500);
    }

    // ==================== manual override ====================

    #[test]
    fn test_manual_override_replaces_computed_amount() {
        let financials = ShowFinancials { total_amount: 200_000, total_expenses: 20_000 };
        let result = compute_payout(
            &percentage_config(),
            &PayoutInput::ManualOverride { amount: 12_345 },
            &financials,
        );
        assert_eq!(result.amount, 12_345);
        // Recorded as fixed regardless of the member's configured type
        assert_eq!(result.payment_type, PaymentType::Fixed);
        assert_eq!(result.payment_value, dec!(12345));
    }
}
