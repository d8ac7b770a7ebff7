//! Company lifecycle and financial simulation engine.
//!
//! Deterministic core for a business simulation game: players found
//! companies, staff them, grow them through maturity stages, take them
//! public, and exit through sale, acquisition, or closure. All money is
//! i64 cents and all randomness flows through a seeded [`rng::GameRng`],
//! so a run is reproducible from its seed and save file.
//!
//! The crate is organized as one aggregate ([`models::company`]) plus a
//! set of engine modules that are its only mutation paths, orchestrated by
//! [`manager::CompanyManager`]:
//!
//! - [`stage`]: maturity gates and upgrades
//! - [`workforce`]: hiring, firing, expansion, payroll, attrition
//! - [`capital`]: IPO, secondary offerings, delisting
//! - [`valuation`]: pricing, acquisitions, sales
//! - [`operations`]: development actions
//! - [`storage`]: atomic, versioned, checksummed persistence

pub mod capital;
pub mod config;
pub mod manager;
pub mod models;
pub mod operations;
pub mod rng;
pub mod stage;
pub mod storage;
pub mod valuation;
pub mod workforce;

pub use capital::{InMemoryMarketDirectory, MarketDirectory};
pub use config::BalanceConfig;
pub use manager::{CompanyManager, InMemoryLedger, ManagerError, PersonalLedger};
pub use models::company::{CompanyEntity, Industry, Stage};
pub use models::metrics::BusinessMetrics;
pub use models::registry::CompanyRegistry;
pub use models::staff::{Position, StaffMember};
pub use operations::DevelopmentKind;
pub use rng::GameRng;
pub use storage::StorageManager;
