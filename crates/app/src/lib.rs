//! Access-code storefront domain: inventory, ledger, referrals and the redemption workflow.

pub mod admin;
pub mod clock;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;


pub mod uuids;
