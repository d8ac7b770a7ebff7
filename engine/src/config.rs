//! Game-balance configuration.
//!
//! Every hand-tuned constant in the engine lives here as lookup-table data:
//! stage gates, industry valuation multiples, tier salaries, expansion ratio
//! tables, workforce rates, and development action costs. The `Default`
//! implementation is the balance baseline; the engines read the tables and
//! never embed their own magic numbers.
//!
//! All monetary values are i64 cents.

use crate::models::company::{Industry, Stage};
use crate::models::staff::Position;
use crate::operations::DevelopmentKind;
use serde::{Deserialize, Serialize};

/// Gates a company must clear to advance to a given stage. All gates must
/// pass simultaneously; there is no partial credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRequirement {
    /// Minimum annual revenue (cents)
    pub min_revenue: i64,
    /// Minimum actual headcount (roster length, not the cached metric)
    pub min_staff: usize,
    /// Minimum performance score
    pub min_performance: f64,
    /// Minimum market share
    pub min_market_share: f64,
    /// Maximum debt ratio
    pub max_debt_ratio: f64,
    /// Minimum age in days since founding
    pub min_age_days: i64,
    /// Minimum special condition score (`performance + growth * 100`)
    pub min_special_score: f64,
    /// How much risk relief the upgrade grants (risk level floors at 1)
    pub risk_relief: i32,
}

/// Valuation multiples for one industry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndustryMultiples {
    pub revenue_multiple: f64,
    pub profit_multiple: f64,
}

/// Cost and effect bounds for one development action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentCost {
    /// Capital consumed by the action (cents)
    pub cost: i64,
    /// Probability the action lands on its favorable branch
    pub success_chance: f64,
}

/// The full balance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    // Workforce
    /// Hard per-company roster ceiling
    pub max_staff: usize,
    /// Per-call ceiling for batch expansion
    pub max_batch_hire: usize,
    /// Months of salary reserved as a deposit when hiring
    pub hire_deposit_months: i64,
    /// Severance range in months of salary, inclusive bounds
    pub severance_months_min: i64,
    pub severance_months_max: i64,
    /// Monthly base departure probability
    pub attrition_base_rate: f64,
    /// Added when a member's performance is below `attrition_low_perf_cutoff`
    pub attrition_low_perf_rate: f64,
    pub attrition_low_perf_cutoff: f64,
    /// Added when cash covers less than two months of payroll
    pub attrition_low_runway_rate: f64,
    /// Departure share in one tick that triggers the shock penalty
    pub attrition_shock_threshold: f64,
    /// Profit haircut applied on a departure shock
    pub attrition_shock_profit_penalty: f64,

    // Capital markets
    /// Minimum annual revenue to list (cents)
    pub ipo_min_revenue: i64,
    /// Minimum actual headcount to list
    pub ipo_min_staff: usize,
    /// Secondary offering price band around the current price (0.5 = ±50%)
    pub offering_price_band: f64,
    /// Secondary offering cap as a share of shares outstanding
    pub offering_share_cap: f64,
    /// Market reception range for offering proceeds
    pub offering_confidence_min: f64,
    pub offering_confidence_max: f64,
    /// Shareholder buyback share of market cap on delisting
    pub delist_buyback_rate: f64,
    /// Fee share of market cap on delisting
    pub delist_fee_rate: f64,

    // Valuation & M&A
    /// Equity uplift factor in the private-company blend
    pub valuation_equity_factor: f64,
    /// Premium bounds derived from the financial score
    pub premium_min: f64,
    pub premium_max: f64,
    /// Profit integration discount applied when merging a target
    pub merge_profit_retention: f64,
    /// Accepted sale price band around computed valuation
    pub sale_price_band_min: f64,
    pub sale_price_band_max: f64,

    // Stage progression
    /// One-time revenue bonus applied on upgrade
    pub upgrade_revenue_bonus: f64,
    /// Performance score bump applied on upgrade
    pub upgrade_performance_bonus: f64,

    // Tables
    /// Requirements to *reach* each stage beyond seed, in stage order
    pub stage_requirements: Vec<(Stage, StageRequirement)>,
    /// Valuation multiples per industry
    pub industry_multiples: Vec<(Industry, IndustryMultiples)>,
    /// Monthly base salary per tier (cents)
    pub base_salaries: Vec<(Position, i64)>,
    /// Expansion tier ratios by headcount bracket; each row sums to 1.0 and
    /// is indexed like `Position::ALL`
    pub expansion_brackets: Vec<(usize, [f64; 7])>,
    /// Cost and success chance per development action
    pub development_costs: Vec<(DevelopmentKind, DevelopmentCost)>,
}

impl BalanceConfig {
    pub fn stage_requirement(&self, stage: Stage) -> Option<&StageRequirement> {
        self.stage_requirements
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, req)| req)
    }

    pub fn multiples(&self, industry: Industry) -> IndustryMultiples {
        self.industry_multiples
            .iter()
            .find(|(i, _)| *i == industry)
            .map(|(_, m)| *m)
            // Unlisted industries fall back to conservative multiples
            .unwrap_or(IndustryMultiples {
                revenue_multiple: 1.0,
                profit_multiple: 8.0,
            })
    }

    pub fn base_salary(&self, position: Position) -> i64 {
        self.base_salaries
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, s)| *s)
            .unwrap_or(300_000)
    }

    /// Tier ratio row for a company of `headcount` employees.
    pub fn expansion_ratios(&self, headcount: usize) -> [f64; 7] {
        for (limit, ratios) in &self.expansion_brackets {
            if headcount < *limit {
                return *ratios;
            }
        }
        self.expansion_brackets
            .last()
            .map(|(_, r)| *r)
            .unwrap_or([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    pub fn development_cost(&self, kind: DevelopmentKind) -> DevelopmentCost {
        self.development_costs
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
            .unwrap_or(DevelopmentCost {
                cost: 5_000_000,
                success_chance: 0.5,
            })
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_staff: 10_000,
            max_batch_hire: 50,
            hire_deposit_months: 3,
            severance_months_min: 1,
            severance_months_max: 3,
            attrition_base_rate: 0.02,
            attrition_low_perf_rate: 0.08,
            attrition_low_perf_cutoff: 40.0,
            attrition_low_runway_rate: 0.10,
            attrition_shock_threshold: 0.20,
            attrition_shock_profit_penalty: 0.10,

            ipo_min_revenue: 500_000_000,  // $5M
            ipo_min_staff: 20,
            offering_price_band: 0.5,
            offering_share_cap: 0.5,
            offering_confidence_min: 0.7,
            offering_confidence_max: 1.0,
            delist_buyback_rate: 0.80,
            delist_fee_rate: 0.05,

            valuation_equity_factor: 1.2,
            premium_min: 0.10,
            premium_max: 0.70,
            merge_profit_retention: 0.8,
            sale_price_band_min: 0.5,
            sale_price_band_max: 1.5,

            upgrade_revenue_bonus: 0.10,
            upgrade_performance_bonus: 5.0,

            stage_requirements: vec![
                (
                    Stage::Startup,
                    StageRequirement {
                        min_revenue: 10_000_000, // $100k
                        min_staff: 5,
                        min_performance: 40.0,
                        min_market_share: 0.001,
                        max_debt_ratio: 0.80,
                        min_age_days: 30,
                        min_special_score: 45.0,
                        risk_relief: 0,
                    },
                ),
                (
                    Stage::Growth,
                    StageRequirement {
                        min_revenue: 100_000_000, // $1M
                        min_staff: 20,
                        min_performance: 50.0,
                        min_market_share: 0.005,
                        max_debt_ratio: 0.70,
                        min_age_days: 90,
                        min_special_score: 60.0,
                        risk_relief: 1,
                    },
                ),
                (
                    Stage::Mature,
                    StageRequirement {
                        min_revenue: 1_000_000_000, // $10M
                        min_staff: 50,
                        min_performance: 60.0,
                        min_market_share: 0.02,
                        max_debt_ratio: 0.60,
                        min_age_days: 180,
                        min_special_score: 75.0,
                        risk_relief: 1,
                    },
                ),
                (
                    Stage::Expansion,
                    StageRequirement {
                        min_revenue: 5_000_000_000, // $50M
                        min_staff: 100,
                        min_performance: 70.0,
                        min_market_share: 0.05,
                        max_debt_ratio: 0.50,
                        min_age_days: 365,
                        min_special_score: 90.0,
                        risk_relief: 1,
                    },
                ),
                (
                    Stage::Corporate,
                    StageRequirement {
                        min_revenue: 20_000_000_000, // $200M
                        min_staff: 250,
                        min_performance: 80.0,
                        min_market_share: 0.10,
                        max_debt_ratio: 0.40,
                        min_age_days: 730,
                        min_special_score: 105.0,
                        risk_relief: 2,
                    },
                ),
            ],

            industry_multiples: vec![
                (Industry::Technology, IndustryMultiples { revenue_multiple: 5.0, profit_multiple: 18.0 }),
                (Industry::Finance, IndustryMultiples { revenue_multiple: 3.0, profit_multiple: 12.0 }),
                (Industry::Healthcare, IndustryMultiples { revenue_multiple: 4.0, profit_multiple: 16.0 }),
                (Industry::Retail, IndustryMultiples { revenue_multiple: 1.5, profit_multiple: 10.0 }),
                (Industry::Manufacturing, IndustryMultiples { revenue_multiple: 1.8, profit_multiple: 11.0 }),
                (Industry::Energy, IndustryMultiples { revenue_multiple: 2.0, profit_multiple: 9.0 }),
                (Industry::Media, IndustryMultiples { revenue_multiple: 3.5, profit_multiple: 14.0 }),
                (Industry::FoodBeverage, IndustryMultiples { revenue_multiple: 1.6, profit_multiple: 10.0 }),
                (Industry::RealEstate, IndustryMultiples { revenue_multiple: 2.2, profit_multiple: 8.0 }),
                (Industry::Transportation, IndustryMultiples { revenue_multiple: 1.4, profit_multiple: 9.0 }),
                (Industry::Education, IndustryMultiples { revenue_multiple: 2.5, profit_multiple: 12.0 }),
                (Industry::Entertainment, IndustryMultiples { revenue_multiple: 3.0, profit_multiple: 13.0 }),
            ],

            base_salaries: vec![
                (Position::Intern, 200_000),          // $2,000/mo
                (Position::Assistant, 300_000),
                (Position::Engineer, 800_000),
                (Position::SeniorEngineer, 1_500_000),
                (Position::Manager, 2_000_000),
                (Position::Director, 3_000_000),
                (Position::VicePresident, 5_000_000),
            ],

            // Brackets are upper-exclusive headcount limits; the final row
            // covers everything at or above the previous limit.
            expansion_brackets: vec![
                (20, [0.30, 0.25, 0.30, 0.10, 0.05, 0.00, 0.00]),
                (50, [0.20, 0.20, 0.30, 0.15, 0.10, 0.05, 0.00]),
                (100, [0.15, 0.15, 0.30, 0.20, 0.10, 0.07, 0.03]),
                (usize::MAX, [0.10, 0.12, 0.28, 0.22, 0.13, 0.10, 0.05]),
            ],

            development_costs: vec![
                (DevelopmentKind::ResearchAndDevelopment, DevelopmentCost { cost: 5_000_000, success_chance: 0.6 }),
                (DevelopmentKind::Marketing, DevelopmentCost { cost: 3_000_000, success_chance: 0.75 }),
                (DevelopmentKind::StaffTraining, DevelopmentCost { cost: 2_000_000, success_chance: 0.9 }),
                (DevelopmentKind::Infrastructure, DevelopmentCost { cost: 8_000_000, success_chance: 0.7 }),
                (DevelopmentKind::MarketExpansion, DevelopmentCost { cost: 10_000_000, success_chance: 0.5 }),
            ],
        }
    }
}
