//! Database models

pub mod member;
pub mod show;

pub use member::{BandMember, MemberRole, MemberShowEarning, PaymentType};
pub use show::{
    NewShowMember, RefundType, RetainedFundAllocation, Show, ShowExpense, ShowMember, ShowStatus,
};
