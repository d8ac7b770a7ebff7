//! Company aggregate root.
//!
//! A [`CompanyEntity`] combines identity, business metrics, the staff roster,
//! the company-owned cash account (distinct from the founder's personal
//! cash), public-market state, and a bounded news log.
//!
//! # Critical Invariants
//!
//! 1. `metrics.employees == staff.len()` at all times; the roster mutators
//!    here resynchronize it and nothing else may write it
//! 2. `market_cap == stock_price * shares_outstanding` is recomputed by the
//!    price/share mutators and never written independently
//! 3. `company_cash` never goes negative: `debit_cash` fails closed
//! 4. `stage` only advances forward, one step at a time
//! 5. `company_id` is immutable and never reused

use crate::models::metrics::BusinessMetrics;
use crate::models::news::{ImpactKind, NewsCategory, NewsLog};
use crate::models::staff::StaffMember;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by company-level cash and market mutators.
#[derive(Debug, Error, PartialEq)]
pub enum CompanyError {
    #[error("Insufficient company funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: i64 },
}

/// Industry category. Closed set; the valuation multiple table in
/// `BalanceConfig` is keyed by these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Technology,
    Finance,
    Healthcare,
    Retail,
    Manufacturing,
    Energy,
    Media,
    FoodBeverage,
    RealEstate,
    Transportation,
    Education,
    Entertainment,
}

impl Industry {
    pub const ALL: [Industry; 12] = [
        Industry::Technology,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Retail,
        Industry::Manufacturing,
        Industry::Energy,
        Industry::Media,
        Industry::FoodBeverage,
        Industry::RealEstate,
        Industry::Transportation,
        Industry::Education,
        Industry::Entertainment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Industry::Technology => "Technology",
            Industry::Finance => "Finance",
            Industry::Healthcare => "Healthcare",
            Industry::Retail => "Retail",
            Industry::Manufacturing => "Manufacturing",
            Industry::Energy => "Energy",
            Industry::Media => "Media",
            Industry::FoodBeverage => "Food & Beverage",
            Industry::RealEstate => "Real Estate",
            Industry::Transportation => "Transportation",
            Industry::Education => "Education",
            Industry::Entertainment => "Entertainment",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maturity stage. Strictly ordered; companies advance one step at a time
/// and never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Seed,
    Startup,
    Growth,
    Mature,
    Expansion,
    Corporate,
}

impl Stage {
    /// The next stage in sequence, or `None` at the top.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Seed => Some(Stage::Startup),
            Stage::Startup => Some(Stage::Growth),
            Stage::Growth => Some(Stage::Mature),
            Stage::Mature => Some(Stage::Expansion),
            Stage::Expansion => Some(Stage::Corporate),
            Stage::Corporate => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Seed => "Seed",
            Stage::Startup => "Startup",
            Stage::Growth => "Growth",
            Stage::Mature => "Mature",
            Stage::Expansion => "Expansion",
            Stage::Corporate => "Corporate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A player-created company.
///
/// Fields are private; reads go through accessors and every mutation goes
/// through a method that preserves the invariants above. The engine modules
/// in this crate get `pub(crate)` mutators; external callers only mutate
/// through `CompanyManager` operations.
/// Defaults below keep pre-v2 save files loading: fields the early schema
/// did not have (cash account, roster, news, performance) fill with safe
/// values and the storage layer re-derives the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntity {
    company_id: Uuid,
    name: String,
    /// Stock ticker; set when the company lists, unique among public companies
    #[serde(default)]
    symbol: Option<String>,
    industry: Industry,
    stage: Stage,
    metrics: BusinessMetrics,
    #[serde(default)]
    staff: Vec<StaffMember>,
    /// Next staff id to allocate; never decremented, so ids are never reused
    #[serde(default = "default_next_staff_id")]
    next_staff_id: u64,
    /// Company-owned cash account (cents), distinct from the founder's wallet
    #[serde(default)]
    company_cash: i64,
    /// Cumulative capital injected by the owner (cents)
    #[serde(default)]
    total_investment: i64,
    #[serde(default)]
    is_public: bool,
    /// Per-share price (cents); zero while private
    #[serde(default)]
    stock_price: i64,
    #[serde(default)]
    shares_outstanding: u64,
    /// Always `stock_price * shares_outstanding`
    #[serde(default)]
    market_cap: i64,
    #[serde(default)]
    ipo_price: Option<i64>,
    #[serde(default)]
    ipo_date: Option<NaiveDate>,
    #[serde(default)]
    news: NewsLog,
    /// Composite performance score in [0, 100]
    #[serde(default = "default_performance_score")]
    performance_score: f64,
    /// Risk level in [1, 5]; lower is safer
    #[serde(default = "default_risk_level")]
    risk_level: u8,
    created_by_user: String,
    founded: NaiveDate,
    last_updated: DateTime<Utc>,
}

fn default_next_staff_id() -> u64 {
    1
}

fn default_performance_score() -> f64 {
    50.0
}

fn default_risk_level() -> u8 {
    3
}

impl CompanyEntity {
    /// Create a freshly founded private company.
    ///
    /// `initial_capital` seeds both the company cash account and the asset
    /// base, and is recorded as the first investment.
    pub fn new(
        name: impl Into<String>,
        industry: Industry,
        created_by_user: impl Into<String>,
        founded: NaiveDate,
        initial_capital: i64,
    ) -> Self {
        Self {
            company_id: Uuid::new_v4(),
            name: name.into(),
            symbol: None,
            industry,
            stage: Stage::Seed,
            metrics: BusinessMetrics::starting(initial_capital),
            staff: Vec::new(),
            next_staff_id: 1,
            company_cash: initial_capital,
            total_investment: initial_capital,
            is_public: false,
            stock_price: 0,
            shares_outstanding: 0,
            market_cap: 0,
            ipo_price: None,
            ipo_date: None,
            news: NewsLog::new(),
            performance_score: 50.0,
            risk_level: 3,
            created_by_user: created_by_user.into(),
            founded,
            last_updated: Utc::now(),
        }
    }

    /// Create a company with an established financial profile. Used to seed
    /// non-player competitors and scripted scenarios; player companies start
    /// from [`CompanyEntity::new`] and earn their metrics.
    #[allow(clippy::too_many_arguments)]
    pub fn with_profile(
        name: impl Into<String>,
        industry: Industry,
        stage: Stage,
        created_by_user: impl Into<String>,
        founded: NaiveDate,
        initial_capital: i64,
        mut metrics: BusinessMetrics,
        performance_score: f64,
    ) -> Self {
        let mut entity = Self::new(name, industry, created_by_user, founded, initial_capital);
        // The roster is empty regardless of what the profile claims
        metrics.employees = 0;
        entity.stage = stage;
        entity.metrics = metrics;
        entity.performance_score = performance_score.clamp(0.0, 100.0);
        entity
    }

    /// Reconstruct an entity from persisted state. Only the storage layer
    /// calls this; the argument list is total on purpose so a new field
    /// cannot be forgotten silently.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_snapshot(
        company_id: Uuid,
        name: String,
        symbol: Option<String>,
        industry: Industry,
        stage: Stage,
        metrics: BusinessMetrics,
        staff: Vec<StaffMember>,
        next_staff_id: u64,
        company_cash: i64,
        total_investment: i64,
        is_public: bool,
        stock_price: i64,
        shares_outstanding: u64,
        ipo_price: Option<i64>,
        ipo_date: Option<NaiveDate>,
        news: NewsLog,
        performance_score: f64,
        risk_level: u8,
        created_by_user: String,
        founded: NaiveDate,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let mut entity = Self {
            company_id,
            name,
            symbol,
            industry,
            stage,
            metrics,
            staff,
            next_staff_id,
            company_cash,
            total_investment,
            is_public,
            stock_price,
            shares_outstanding,
            market_cap: 0,
            ipo_price,
            ipo_date,
            news,
            performance_score: performance_score.clamp(0.0, 100.0),
            risk_level: risk_level.clamp(1, 5),
            created_by_user,
            founded,
            last_updated,
        };
        // Derived fields are re-derived, not trusted from disk
        entity.market_cap = entity.stock_price.saturating_mul(entity.shares_outstanding as i64);
        entity.metrics.employees = entity.staff.len() as u32;
        // A migrated document may carry staff without a sequence high-water
        // mark; never let an old mark reissue a live id
        let max_staff_id = entity.staff.iter().map(|s| s.id).max().unwrap_or(0);
        entity.next_staff_id = entity.next_staff_id.max(max_staff_id + 1);
        entity
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn industry(&self) -> Industry {
        self.industry
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn metrics(&self) -> &BusinessMetrics {
        &self.metrics
    }

    pub fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    /// Actual headcount (the roster length, not the cached metric).
    pub fn headcount(&self) -> usize {
        self.staff.len()
    }

    /// High-water mark of the staff id sequence. The storage layer persists
    /// it so ids stay unique across save/load.
    pub(crate) fn next_staff_id(&self) -> u64 {
        self.next_staff_id
    }

    pub fn company_cash(&self) -> i64 {
        self.company_cash
    }

    pub fn total_investment(&self) -> i64 {
        self.total_investment
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn stock_price(&self) -> i64 {
        self.stock_price
    }

    pub fn shares_outstanding(&self) -> u64 {
        self.shares_outstanding
    }

    pub fn market_cap(&self) -> i64 {
        self.market_cap
    }

    pub fn ipo_price(&self) -> Option<i64> {
        self.ipo_price
    }

    pub fn ipo_date(&self) -> Option<NaiveDate> {
        self.ipo_date
    }

    pub fn news(&self) -> &NewsLog {
        &self.news
    }

    pub fn performance_score(&self) -> f64 {
        self.performance_score
    }

    pub fn risk_level(&self) -> u8 {
        self.risk_level
    }

    pub fn created_by_user(&self) -> &str {
        &self.created_by_user
    }

    pub fn founded(&self) -> NaiveDate {
        self.founded
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Company age in whole days as of `today`.
    pub fn age_days(&self, today: NaiveDate) -> i64 {
        (today - self.founded).num_days()
    }

    /// Book equity, derived from metrics.
    pub fn equity(&self) -> i64 {
        self.metrics.equity()
    }

    /// Total monthly payroll across the roster (cents).
    pub fn monthly_payroll(&self) -> i64 {
        self.staff.iter().map(|s| s.salary).sum()
    }

    /// Special condition score used by stage gates:
    /// `performance_score + growth_rate * 100`.
    pub fn special_condition_score(&self) -> f64 {
        self.performance_score + self.metrics.growth_rate * 100.0
    }

    // ------------------------------------------------------------------
    // Cash account
    // ------------------------------------------------------------------

    /// Credit the company cash account.
    pub(crate) fn credit_cash(&mut self, amount: i64) {
        debug_assert!(amount >= 0, "credit amount must be non-negative");
        self.company_cash += amount;
        self.touch();
    }

    /// Debit the company cash account, failing closed if funds are short.
    /// No state changes on error.
    pub(crate) fn debit_cash(&mut self, amount: i64) -> Result<(), CompanyError> {
        if amount <= 0 {
            return Err(CompanyError::NonPositiveAmount { amount });
        }
        if self.company_cash < amount {
            return Err(CompanyError::InsufficientFunds {
                required: amount,
                available: self.company_cash,
            });
        }
        self.company_cash -= amount;
        self.touch();
        Ok(())
    }

    pub(crate) fn record_investment(&mut self, amount: i64) {
        self.total_investment += amount;
    }

    // ------------------------------------------------------------------
    // Roster (the only paths that touch `metrics.employees`)
    // ------------------------------------------------------------------

    /// Allocate the next staff id. Ids are never reused.
    pub(crate) fn allocate_staff_id(&mut self) -> u64 {
        let id = self.next_staff_id;
        self.next_staff_id += 1;
        id
    }

    /// Append a staff member and resynchronize the headcount metric.
    pub(crate) fn add_staff(&mut self, member: StaffMember) {
        debug_assert!(
            member.id < self.next_staff_id,
            "staff id must come from allocate_staff_id"
        );
        self.staff.push(member);
        self.sync_employees();
    }

    /// Remove a staff member by id and resynchronize the headcount metric.
    pub(crate) fn remove_staff(&mut self, staff_id: u64) -> Option<StaffMember> {
        let idx = self.staff.iter().position(|s| s.id == staff_id)?;
        let member = self.staff.remove(idx);
        self.sync_employees();
        Some(member)
    }

    /// Drain the entire roster (acquisition merge). Headcount goes to zero.
    pub(crate) fn drain_staff(&mut self) -> Vec<StaffMember> {
        let staff = std::mem::take(&mut self.staff);
        self.sync_employees();
        staff
    }

    pub(crate) fn staff_iter_mut(&mut self) -> impl Iterator<Item = &mut StaffMember> {
        self.staff.iter_mut()
    }

    fn sync_employees(&mut self) {
        self.metrics.employees = self.staff.len() as u32;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Metrics, scores, stage
    // ------------------------------------------------------------------

    pub(crate) fn metrics_mut(&mut self) -> &mut BusinessMetrics {
        self.touch();
        &mut self.metrics
    }

    pub(crate) fn set_performance_score(&mut self, score: f64) {
        self.performance_score = score.clamp(0.0, 100.0);
        self.touch();
    }

    pub(crate) fn set_risk_level(&mut self, level: i32) {
        self.risk_level = level.clamp(1, 5) as u8;
        self.touch();
    }

    /// Advance to `next`. Only the stage manager calls this, after its gates.
    pub(crate) fn advance_stage(&mut self, next: Stage) {
        debug_assert_eq!(self.stage.next(), Some(next), "stages cannot be skipped");
        self.stage = next;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Public-market state (owned by the capital markets engine)
    // ------------------------------------------------------------------

    /// List the company: one-way transition performed by `go_public`.
    pub(crate) fn mark_public(
        &mut self,
        symbol: String,
        price: i64,
        shares: u64,
        ipo_date: NaiveDate,
    ) {
        self.symbol = Some(symbol);
        self.is_public = true;
        self.ipo_price = Some(price);
        self.ipo_date = Some(ipo_date);
        self.stock_price = price;
        self.shares_outstanding = shares;
        self.recompute_market_cap();
    }

    /// Update the share price, recomputing market cap.
    pub(crate) fn set_stock_price(&mut self, price: i64) {
        debug_assert!(price >= 0);
        self.stock_price = price;
        self.recompute_market_cap();
    }

    /// Update shares outstanding, recomputing market cap.
    pub(crate) fn set_shares_outstanding(&mut self, shares: u64) {
        self.shares_outstanding = shares;
        self.recompute_market_cap();
    }

    /// Revert to private: delisting or acquisition teardown.
    pub(crate) fn mark_private(&mut self) {
        self.is_public = false;
        self.stock_price = 0;
        self.shares_outstanding = 0;
        self.recompute_market_cap();
    }

    fn recompute_market_cap(&mut self) {
        self.market_cap = self.stock_price.saturating_mul(self.shares_outstanding as i64);
        self.touch();
    }

    // ------------------------------------------------------------------
    // News
    // ------------------------------------------------------------------

    pub(crate) fn push_news(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        impact_type: ImpactKind,
        impact_magnitude: f64,
        category: NewsCategory,
    ) {
        self.news
            .publish(title, content, impact_type, impact_magnitude, category);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::staff::Position;
    use std::collections::BTreeSet;

    fn member(id: u64, salary: i64) -> StaffMember {
        StaffMember {
            id,
            name: format!("staff {}", id),
            position: Position::Engineer,
            salary,
            hire_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            performance: 60.0,
            experience: 2.0,
            leadership: 40.0,
            innovation: 50.0,
            special_skills: BTreeSet::new(),
        }
    }

    fn company() -> CompanyEntity {
        CompanyEntity::new(
            "Acme",
            Industry::Technology,
            "user-1",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            1_000_000,
        )
    }

    #[test]
    fn debit_fails_closed() {
        let mut c = company();
        let err = c.debit_cash(2_000_000).unwrap_err();
        assert_eq!(
            err,
            CompanyError::InsufficientFunds {
                required: 2_000_000,
                available: 1_000_000
            }
        );
        assert_eq!(c.company_cash(), 1_000_000);
    }

    #[test]
    fn roster_mutators_resync_headcount() {
        let mut c = company();
        let id = c.allocate_staff_id();
        c.add_staff(member(id, 500_000));
        assert_eq!(c.metrics().employees, 1);
        assert_eq!(c.headcount(), 1);

        c.remove_staff(id).unwrap();
        assert_eq!(c.metrics().employees, 0);

        // Ids are never reused
        assert_eq!(c.allocate_staff_id(), 2);
    }

    #[test]
    fn market_cap_tracks_price_and_shares() {
        let mut c = company();
        c.mark_public(
            "ACME".to_string(),
            1_000,
            1_000_000,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert_eq!(c.market_cap(), 1_000_000_000);

        c.set_stock_price(1_100);
        assert_eq!(c.market_cap(), 1_100_000_000);

        c.set_shares_outstanding(2_000_000);
        assert_eq!(c.market_cap(), 2_200_000_000);

        c.mark_private();
        assert_eq!(c.market_cap(), 0);
        assert!(!c.is_public());
        // Ticker survives delisting; a later re-IPO is a fresh event
        assert_eq!(c.symbol(), Some("ACME"));
    }

    #[test]
    fn age_in_days() {
        let c = company();
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(c.age_days(today), 60);
    }
}
