//! Valuation and acquisition scenarios.

use chrono::NaiveDate;
use venture_simulator_core::models::metrics::BusinessMetrics;
use venture_simulator_core::valuation::{
    evaluate_acquisition, evaluate_sale, execute_acquisition, financial_score, ValuationError,
};
use venture_simulator_core::workforce::{self, Candidate};
use venture_simulator_core::{
    BalanceConfig, CompanyEntity, CompanyRegistry, Industry, Position, Stage,
};

fn founded() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn candidate(salary: i64) -> Candidate {
    Candidate {
        name: "Ana Silva".to_string(),
        position: Position::Manager,
        salary,
        performance: 70.0,
        experience: 8.0,
        leadership: 75.0,
        innovation: 60.0,
        special_skills: Default::default(),
    }
}

fn profiled(name: &str, user: &str, industry: Industry, revenue: i64, profit: i64) -> CompanyEntity {
    let metrics = BusinessMetrics {
        revenue,
        profit,
        assets: revenue / 2,
        liabilities: revenue / 10,
        employees: 0,
        market_share: 0.01,
        growth_rate: 0.08,
        debt_ratio: 0.2,
    };
    CompanyEntity::with_profile(
        name,
        industry,
        Stage::Startup,
        user,
        founded(),
        10_000_000,
        metrics,
        60.0,
    )
}

#[test]
fn industry_multiples_change_the_price() {
    let config = BalanceConfig::default();
    let tech = profiled("Tech Co", "a", Industry::Technology, 100_000_000, 10_000_000);
    let retail = profiled("Shop Co", "a", Industry::Retail, 100_000_000, 10_000_000);

    let tech_quote = evaluate_acquisition(&tech, &config);
    let retail_quote = evaluate_acquisition(&retail, &config);
    assert!(
        tech_quote.base_value > retail_quote.base_value,
        "technology multiples should out-price retail on identical books"
    );
}

#[test]
fn acquisition_conserves_money_and_staff() {
    let config = BalanceConfig::default();
    let mut registry = CompanyRegistry::new();

    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let metrics = BusinessMetrics {
        revenue: 2_000_000_000,
        profit: 300_000_000,
        assets: 1_000_000_000,
        liabilities: 200_000_000,
        employees: 0,
        market_share: 0.05,
        growth_rate: 0.08,
        debt_ratio: 0.2,
    };
    let mut acquirer = CompanyEntity::with_profile(
        "Whale Co",
        Industry::Finance,
        Stage::Growth,
        "alice",
        founded(),
        100_000_000_000,
        metrics,
        60.0,
    );
    for _ in 0..4 {
        workforce::hire(&mut acquirer, candidate(1_500_000), today, &config).unwrap();
    }
    let staff_before = acquirer.headcount();
    let cash_before = acquirer.company_cash();

    let mut target = profiled("Minnow Co", "bob", Industry::Finance, 50_000_000, 5_000_000);
    for _ in 0..2 {
        workforce::hire(&mut target, candidate(1_000_000), today, &config).unwrap();
    }
    let target_revenue = target.metrics().revenue;
    let quote = evaluate_acquisition(&target, &config);

    let aid = acquirer.company_id();
    let tid = target.company_id();
    registry.insert(acquirer);
    registry.insert(target);

    let report = execute_acquisition(&mut registry, aid, tid, &config).unwrap();

    assert!(registry.get(tid).is_none(), "target must leave the registry");
    assert!(!registry.is_owner("bob", tid));
    let merged = registry.get(aid).unwrap();
    assert_eq!(report.price_paid, quote.total_price);
    assert_eq!(merged.company_cash(), cash_before - report.price_paid);
    assert_eq!(merged.headcount(), staff_before + 2);
    assert!(merged.metrics().revenue >= target_revenue);

    // Absorbed staff carry acquirer-issued ids
    let mut ids: Vec<u64> = merged.staff().iter().map(|s| s.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), merged.headcount());
}

#[test]
fn failed_acquisition_is_a_no_op() {
    let config = BalanceConfig::default();
    let mut registry = CompanyRegistry::new();
    let acquirer = profiled("Broke Co", "alice", Industry::Retail, 10_000_000, 1_000_000);
    let target = profiled("Prize Co", "bob", Industry::Technology, 900_000_000, 90_000_000);
    let aid = acquirer.company_id();
    let tid = target.company_id();
    registry.insert(acquirer);
    registry.insert(target);

    let err = execute_acquisition(&mut registry, aid, tid, &config).unwrap_err();
    assert!(matches!(err, ValuationError::InsufficientFunds { .. }));
    assert!(registry.get(tid).is_some());
    assert!(registry.is_owner("bob", tid));
    assert_eq!(registry.len(), 2);
}

#[test]
fn score_orders_companies_by_health() {
    let strong = profiled("Fit Co", "a", Industry::Technology, 500_000_000, 100_000_000);
    let weak = profiled("Frail Co", "a", Industry::Technology, 500_000_000, -50_000_000);
    assert!(financial_score(&strong) > financial_score(&weak));
}

#[test]
fn sale_band_scales_with_valuation() {
    let config = BalanceConfig::default();
    let c = profiled("Exit Co", "a", Industry::Media, 200_000_000, 20_000_000);
    let quote = evaluate_sale(&c, &config);
    assert_eq!(quote.min_price, quote.valuation / 2);
    assert_eq!(quote.max_price, quote.valuation + quote.valuation / 2);
    // No roster, no severance floor
    assert_eq!(quote.severance_floor, 0);
}
