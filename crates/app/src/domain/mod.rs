//! Storefront Domain Concerns

pub mod codes;
pub mod ledger;
pub mod redemptions;
pub mod referrals;
