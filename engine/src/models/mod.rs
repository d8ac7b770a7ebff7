//! Domain types: metrics, staff, news, the company aggregate, and the
//! registry that owns all companies.

pub mod company;
pub mod metrics;
pub mod news;
pub mod registry;
pub mod staff;
