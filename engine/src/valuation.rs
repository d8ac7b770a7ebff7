//! Valuation, acquisitions, and company sales.
//!
//! Public companies are worth their market cap; private companies are
//! valued by an industry-multiple blend over revenue, profit, and book
//! equity. An acquisition premium on top scales with the target's financial
//! health score.
//!
//! # Critical Invariants
//!
//! - A merge is atomic: the price debit, metric fold-in, staff transfer,
//!   and target removal happen together or not at all
//! - Transferred staff receive fresh ids from the acquirer's sequence;
//!   target ids never leak into another roster
//! - A sale price must clear accumulated severance obligations

use crate::config::BalanceConfig;
use crate::models::company::CompanyEntity;
use crate::models::news::{ImpactKind, NewsCategory};
use crate::models::registry::CompanyRegistry;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors from valuation and merge operations.
#[derive(Debug, Error, PartialEq)]
pub enum ValuationError {
    #[error("Company {company_id} not found")]
    CompanyNotFound { company_id: Uuid },

    #[error("A company cannot acquire itself")]
    SelfAcquisition,

    #[error("Insufficient company funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Offered price {price} outside the accepted band {min} to {max}")]
    PriceOutsideBand { price: i64, min: i64, max: i64 },

    #[error("Offered price {price} below severance obligations of {severance}")]
    PriceBelowSeverance { price: i64, severance: i64 },
}

/// Composite financial health score in [0, 100].
///
/// Component caps: return on equity 30, growth 25, leverage headroom 20,
/// market share 15, return on assets 10. Negative components contribute
/// zero rather than dragging the score below the floor.
pub fn financial_score(company: &CompanyEntity) -> f64 {
    let m = company.metrics();
    let mut score = 0.0;
    score += (m.roe() * 100.0).clamp(0.0, 30.0);
    score += (m.growth_rate * 100.0).clamp(0.0, 25.0);
    score += ((1.0 - m.debt_ratio) * 20.0).clamp(0.0, 20.0);
    score += (m.market_share * 300.0).clamp(0.0, 15.0);
    score += (m.roa() * 100.0).clamp(0.0, 10.0);
    score.clamp(0.0, 100.0)
}

/// Priced acquisition quote for a target.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionQuote {
    /// Market cap for public targets, multiple blend for private ones (cents)
    pub base_value: i64,
    /// Premium rate derived from the target's financial score
    pub premium_rate: f64,
    pub premium: i64,
    pub total_price: i64,
    pub financial_score: f64,
}

/// Value `target` and price an acquisition.
///
/// Public targets are taken at market cap. Private targets blend
/// `0.4 * revenue * revenue_multiple + 0.4 * profit * profit_multiple +
/// 0.2 * equity * equity_factor`, floored at zero. The premium rate moves
/// linearly with the financial score between the configured bounds.
pub fn evaluate_acquisition(target: &CompanyEntity, config: &BalanceConfig) -> AcquisitionQuote {
    let base_value = if target.is_public() {
        target.market_cap()
    } else {
        private_valuation(target, config)
    };

    let score = financial_score(target);
    let premium_rate =
        config.premium_min + (score / 100.0) * (config.premium_max - config.premium_min);
    let premium = (base_value as f64 * premium_rate) as i64;

    AcquisitionQuote {
        base_value,
        premium_rate,
        premium,
        total_price: base_value + premium,
        financial_score: score,
    }
}

fn private_valuation(company: &CompanyEntity, config: &BalanceConfig) -> i64 {
    let m = company.metrics();
    let multiples = config.multiples(company.industry());
    let blend = 0.4 * m.revenue as f64 * multiples.revenue_multiple
        + 0.4 * m.profit as f64 * multiples.profit_multiple
        + 0.2 * m.equity() as f64 * config.valuation_equity_factor;
    (blend.max(0.0)) as i64
}

/// Outcome of a completed merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub price_paid: i64,
    pub staff_absorbed: usize,
    pub revenue_added: i64,
    /// Target profit after the integration discount (cents)
    pub profit_added: i64,
}

/// Acquire `target_id` into `acquirer_id` at the quoted price.
///
/// The acquirer pays `evaluate_acquisition().total_price` from company cash.
/// Target revenue, assets, liabilities, and market share fold in whole;
/// profit folds in at the integration retention rate. Staff transfer with
/// fresh ids. The target leaves the registry permanently.
///
/// Every precondition is checked before the first mutation.
pub fn execute_acquisition(
    registry: &mut CompanyRegistry,
    acquirer_id: Uuid,
    target_id: Uuid,
    config: &BalanceConfig,
) -> Result<MergeReport, ValuationError> {
    if acquirer_id == target_id {
        return Err(ValuationError::SelfAcquisition);
    }
    let target = registry
        .get(target_id)
        .ok_or(ValuationError::CompanyNotFound {
            company_id: target_id,
        })?;
    let quote = evaluate_acquisition(target, config);
    let price = quote.total_price;

    let acquirer = registry
        .get(acquirer_id)
        .ok_or(ValuationError::CompanyNotFound {
            company_id: acquirer_id,
        })?;
    if acquirer.company_cash() < price {
        return Err(ValuationError::InsufficientFunds {
            required: price,
            available: acquirer.company_cash(),
        });
    }

    // All checks passed; the removal and fold-in cannot fail from here
    let mut target = registry
        .remove(target_id)
        .ok_or(ValuationError::CompanyNotFound {
            company_id: target_id,
        })?;
    let target_name = target.name().to_string();
    let staff = target.drain_staff();
    let staff_absorbed = staff.len();
    let tm = target.metrics().clone();
    let profit_added = (tm.profit as f64 * config.merge_profit_retention) as i64;

    let acquirer = registry
        .get_mut(acquirer_id)
        .ok_or(ValuationError::CompanyNotFound {
            company_id: acquirer_id,
        })?;
    acquirer
        .debit_cash(price)
        .map_err(|_| ValuationError::InsufficientFunds {
            required: price,
            available: acquirer.company_cash(),
        })?;
    {
        let m = acquirer.metrics_mut();
        m.revenue += tm.revenue;
        m.assets += tm.assets;
        m.liabilities += tm.liabilities;
        m.profit += profit_added;
        m.market_share += tm.market_share;
    }
    for mut member in staff {
        member.id = acquirer.allocate_staff_id();
        acquirer.add_staff(member);
    }
    acquirer.push_news(
        format!("{} acquires {}", acquirer.name(), target_name),
        format!(
            "Completed the acquisition for {}, absorbing {} employees and {} in annual revenue.",
            price, staff_absorbed, tm.revenue
        ),
        ImpactKind::Positive,
        0.7,
        NewsCategory::Deal,
    );
    info!(
        acquirer = acquirer.name(),
        target = %target_name,
        price,
        staff_absorbed,
        "acquisition completed"
    );

    Ok(MergeReport {
        price_paid: price,
        staff_absorbed,
        revenue_added: tm.revenue,
        profit_added,
    })
}

/// Terms for selling a whole company to an outside buyer.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleQuote {
    /// Fair value per [`evaluate_acquisition`] pricing, without premium (cents)
    pub valuation: i64,
    pub min_price: i64,
    pub max_price: i64,
    /// Worst-case severance owed to the whole roster on handover (cents)
    pub severance_floor: i64,
}

/// Quote the acceptable price band for selling `company` outright.
pub fn evaluate_sale(company: &CompanyEntity, config: &BalanceConfig) -> SaleQuote {
    let valuation = if company.is_public() {
        company.market_cap()
    } else {
        private_valuation(company, config)
    };
    let severance_floor = company.monthly_payroll() * config.severance_months_max;
    SaleQuote {
        valuation,
        min_price: (valuation as f64 * config.sale_price_band_min) as i64,
        max_price: (valuation as f64 * config.sale_price_band_max) as i64,
        severance_floor,
    }
}

/// Validate an asking price against the sale quote. The price must sit
/// inside the band and clear the severance floor.
pub fn check_sale_price(
    company: &CompanyEntity,
    price: i64,
    config: &BalanceConfig,
) -> Result<SaleQuote, ValuationError> {
    let quote = evaluate_sale(company, config);
    if price < quote.min_price || price > quote.max_price {
        return Err(ValuationError::PriceOutsideBand {
            price,
            min: quote.min_price,
            max: quote.max_price,
        });
    }
    if price < quote.severance_floor {
        return Err(ValuationError::PriceBelowSeverance {
            price,
            severance: quote.severance_floor,
        });
    }
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::Industry;
    use chrono::NaiveDate;

    fn founded() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn private_target() -> CompanyEntity {
        let mut c = CompanyEntity::new("Target Co", Industry::Technology, "bob", founded(), 0);
        let m = c.metrics_mut();
        m.revenue = 100_000_000;
        m.profit = 10_000_000;
        m.assets = 50_000_000;
        m.liabilities = 10_000_000;
        c
    }

    #[test]
    fn score_stays_in_bounds() {
        let mut c = private_target();
        assert!((0.0..=100.0).contains(&financial_score(&c)));

        // Deeply unhealthy company floors at zero, does not go negative
        let m = c.metrics_mut();
        m.profit = -1_000_000_000;
        m.growth_rate = -0.9;
        m.debt_ratio = 3.0;
        assert!(financial_score(&c) >= 0.0);
    }

    #[test]
    fn private_valuation_blends_multiples() {
        let config = BalanceConfig::default();
        let c = private_target();
        let quote = evaluate_acquisition(&c, &config);

        // 0.4*100M*5.0 + 0.4*10M*18.0 + 0.2*40M*1.2
        let expected = (0.4 * 100_000_000.0 * 5.0
            + 0.4 * 10_000_000.0 * 18.0
            + 0.2 * 40_000_000.0 * 1.2) as i64;
        assert_eq!(quote.base_value, expected);
        assert!(quote.premium_rate >= config.premium_min);
        assert!(quote.premium_rate <= config.premium_max);
        assert_eq!(quote.total_price, quote.base_value + quote.premium);
    }

    #[test]
    fn public_target_priced_at_market_cap() {
        let config = BalanceConfig::default();
        let mut c = private_target();
        c.mark_public("TGT".to_string(), 1_000, 1_000_000, founded());
        let quote = evaluate_acquisition(&c, &config);
        assert_eq!(quote.base_value, 1_000_000_000);
    }

    #[test]
    fn healthier_targets_command_higher_premiums() {
        let config = BalanceConfig::default();
        let healthy = private_target();
        let mut weak = private_target();
        {
            let m = weak.metrics_mut();
            m.profit = -5_000_000;
            m.debt_ratio = 1.5;
        }
        let hq = evaluate_acquisition(&healthy, &config);
        let wq = evaluate_acquisition(&weak, &config);
        assert!(hq.premium_rate > wq.premium_rate);
    }

    #[test]
    fn merge_folds_in_target_and_reids_staff() {
        let config = BalanceConfig::default();
        let mut registry = CompanyRegistry::new();

        let mut acquirer =
            CompanyEntity::new("Big Co", Industry::Technology, "alice", founded(), 0);
        acquirer.credit_cash(100_000_000_000);
        acquirer.metrics_mut().revenue = 500_000_000;
        let aid = acquirer.company_id();
        // Existing staff so transferred ids must not collide
        let id = acquirer.allocate_staff_id();
        acquirer.add_staff(crate::workforce::tests_support::member(id));

        let mut target = private_target();
        for _ in 0..3 {
            let id = target.allocate_staff_id();
            target.add_staff(crate::workforce::tests_support::member(id));
        }
        let tid = target.company_id();
        let quote = evaluate_acquisition(&target, &config);

        registry.insert(acquirer);
        registry.insert(target);

        let report = execute_acquisition(&mut registry, aid, tid, &config).unwrap();
        assert_eq!(report.price_paid, quote.total_price);
        assert_eq!(report.staff_absorbed, 3);
        assert_eq!(report.profit_added, 8_000_000);

        assert!(registry.get(tid).is_none());
        let merged = registry.get(aid).unwrap();
        assert_eq!(merged.headcount(), 4);
        assert_eq!(merged.metrics().revenue, 600_000_000);
        assert_eq!(merged.metrics().profit, 8_000_000);
        // Fresh ids, no duplicates
        let mut ids: Vec<u64> = merged.staff().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn underfunded_acquisition_changes_nothing() {
        let config = BalanceConfig::default();
        let mut registry = CompanyRegistry::new();

        let acquirer = CompanyEntity::new("Poor Co", Industry::Retail, "alice", founded(), 100);
        let aid = acquirer.company_id();
        let target = private_target();
        let tid = target.company_id();
        registry.insert(acquirer);
        registry.insert(target);

        let err = execute_acquisition(&mut registry, aid, tid, &config).unwrap_err();
        assert!(matches!(err, ValuationError::InsufficientFunds { .. }));
        assert!(registry.get(tid).is_some());
        assert_eq!(registry.get(aid).unwrap().company_cash(), 100);
    }

    #[test]
    fn self_acquisition_rejected() {
        let config = BalanceConfig::default();
        let mut registry = CompanyRegistry::new();
        let c = private_target();
        let id = c.company_id();
        registry.insert(c);
        assert_eq!(
            execute_acquisition(&mut registry, id, id, &config),
            Err(ValuationError::SelfAcquisition)
        );
    }

    #[test]
    fn sale_price_must_sit_in_band_and_clear_severance() {
        let config = BalanceConfig::default();
        let mut c = private_target();
        for _ in 0..2 {
            let id = c.allocate_staff_id();
            c.add_staff(crate::workforce::tests_support::member(id));
        }
        let quote = evaluate_sale(&c, &config);
        assert!(quote.min_price < quote.max_price);
        assert_eq!(quote.severance_floor, c.monthly_payroll() * 3);

        assert!(check_sale_price(&c, quote.valuation, &config).is_ok());
        assert!(matches!(
            check_sale_price(&c, quote.max_price + 1, &config),
            Err(ValuationError::PriceOutsideBand { .. })
        ));
        assert!(matches!(
            check_sale_price(&c, quote.min_price.saturating_sub(1), &config),
            Err(ValuationError::PriceOutsideBand { .. })
        ));
    }
}
