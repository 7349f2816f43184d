//! Retained-funds allocation strategies.
//!
//! When a cancelled show retains money, the admin can distribute it across
//! selected members. Every strategy is integer-exact: remainders from
//! division or rounding are handed to a designated member instead of being
//! lost.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::calculators::round_rupees;

/// A member selected for allocation, in selection order
#[derive(Debug, Clone)]
pub struct AllocationMember {
    pub band_member_id: Uuid,
    pub name: String,
    /// Relative weight for the weighted strategy: the member's normal rate,
    /// used raw regardless of payment type
    pub weight: Decimal,
}

/// How the retained amount is distributed
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationStrategy {
    /// The single selected member receives the full retained amount
    Assign,
    /// Even split; the FIRST member additionally receives the division
    /// remainder
    Equal,
    /// Split proportional to each member's normal rate; the LAST member
    /// receives the exact rounding remainder. Zero total weight falls back
    /// to an equal split.
    Weighted,
    /// Caller-chosen amounts, index-aligned with the member list
    Manual(Vec<i64>),
}

/// One computed allocation row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub band_member_id: Uuid,
    pub member_name: String,
    pub amount: i64,
}

/// Allocation input errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    NoMembers,
    AssignExpectsSingleMember { got: usize },
    AmountCountMismatch { expected: usize, got: usize },
    ExceedsRetained { total: i64, retained: i64 },
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationError::NoMembers => {
                write!(f, "At least one member must be selected")
            }
            AllocationError::AssignExpectsSingleMember { got } => {
                write!(f, "Assign strategy expects exactly one member, got {}", got)
            }
            AllocationError::AmountCountMismatch { expected, got } => {
                write!(f, "Expected {} manual amounts, got {}", expected, got)
            }
            AllocationError::ExceedsRetained { total, retained } => {
                write!(
                    f,
                    "Allocated total {} exceeds retained amount {}",
                    total, retained
                )
            }
        }
    }
}

impl std::error::Error for AllocationError {}

/// Distribute `retained_amount` across `members` per the chosen strategy.
///
/// Guarantees `sum(amounts) <= retained_amount`; the computed strategies sum
/// exactly to it. Member order is significant: it decides who absorbs
/// remainders.
pub fn allocate(
    retained_amount: i64,
    members: &[AllocationMember],
    strategy: &AllocationStrategy,
) -> Result<Vec<Allocation>, AllocationError> {
    if members.is_empty() {
        return Err(AllocationError::NoMembers);
    }

    match strategy {
        AllocationStrategy::Assign => {
            if members.len() != 1 {
                return Err(AllocationError::AssignExpectsSingleMember { got: members.len() });
            }
            Ok(vec![allocation(&members[0], retained_amount)])
        }
        AllocationStrategy::Equal => Ok(equal_split(retained_amount, members)),
        AllocationStrategy::Weighted => {
            let total_weight: Decimal = members.iter().map(|m| m.weight).sum();
            if total_weight.is_zero() {
                return Ok(equal_split(retained_amount, members));
            }

            let last = members.len() - 1;
            let mut allocated = 0i64;
            let mut result = Vec::with_capacity(members.len());
            for (i, member) in members.iter().enumerate() {
                // Last member takes the exact remainder so the total never
                // drifts from rounding
                let amount = if i == last {
                    retained_amount - allocated
                } else {
                    round_rupees(member.weight / total_weight * Decimal::from(retained_amount))
                };
                allocated += amount;
                result.push(allocation(member, amount));
            }
            Ok(result)
        }
        AllocationStrategy::Manual(amounts) => {
            if amounts.len() != members.len() {
                return Err(AllocationError::AmountCountMismatch {
                    expected: members.len(),
                    got: amounts.len(),
                });
            }
            let total: i64 = amounts.iter().sum();
            if total > retained_amount {
                return Err(AllocationError::ExceedsRetained {
                    total,
                    retained: retained_amount,
                });
            }
            Ok(members
                .iter()
                .zip(amounts)
                .map(|(member, &amount)| allocation(member, amount))
                .collect())
        }
    }
}

fn equal_split(retained_amount: i64, members: &[AllocationMember]) -> Vec<Allocation> {
    let count = members.len() as i64;
    let base = retained_amount / count;
    let remainder = retained_amount - base * count;

    members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let amount = if i == 0 { base + remainder } else { base };
            allocation(member, amount)
        })
        .collect()
}

fn allocation(member: &AllocationMember, amount: i64) -> Allocation {
    Allocation {
        band_member_id: member.band_member_id,
        member_name: member.name.clone(),
        amount,
    }
}
