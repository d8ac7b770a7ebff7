//! Business metrics value object.
//!
//! Pure data: no identity, no behavior beyond derived ratios. Monetary fields
//! are i64 cents (minor units) throughout the engine.
//!
//! # Critical Invariants
//!
//! 1. `equity` is always derived as `assets - liabilities`, never stored
//! 2. `employees` mirrors the owning company's staff roster length; only the
//!    workforce and M&A paths (which own the roster) may change it

use serde::{Deserialize, Serialize};

/// Financial and operational metrics for a single company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    /// Annual revenue (cents)
    pub revenue: i64,

    /// Annual profit (cents, may be negative)
    pub profit: i64,

    /// Total assets (cents)
    pub assets: i64,

    /// Total liabilities (cents)
    pub liabilities: i64,

    /// Headcount. Kept equal to the staff roster length by the roster owners.
    pub employees: u32,

    /// Share of the industry market, in [0, 1]
    pub market_share: f64,

    /// Year-over-year growth rate (0.25 = 25%)
    pub growth_rate: f64,

    /// Debt ratio, in [0, 1]
    pub debt_ratio: f64,
}

impl BusinessMetrics {
    /// Metrics of a freshly founded company: nothing but the initial assets.
    pub fn starting(assets: i64) -> Self {
        Self {
            revenue: 0,
            profit: 0,
            assets,
            liabilities: 0,
            employees: 0,
            market_share: 0.0,
            growth_rate: 0.0,
            debt_ratio: 0.0,
        }
    }

    /// Book equity: `assets - liabilities`.
    pub fn equity(&self) -> i64 {
        self.assets - self.liabilities
    }

    /// Return on equity. Zero when equity is non-positive.
    pub fn roe(&self) -> f64 {
        let equity = self.equity();
        if equity <= 0 {
            0.0
        } else {
            self.profit as f64 / equity as f64
        }
    }

    /// Return on assets. Zero when assets are non-positive.
    pub fn roa(&self) -> f64 {
        if self.assets <= 0 {
            0.0
        } else {
            self.profit as f64 / self.assets as f64
        }
    }
}
