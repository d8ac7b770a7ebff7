//! Workforce invariants: atomic batch expansion, severance bounds, payroll.

use chrono::NaiveDate;
use proptest::prelude::*;
use venture_simulator_core::workforce::{
    self, batch_expand, Candidate, WorkforceError,
};
use venture_simulator_core::{BalanceConfig, CompanyEntity, GameRng, Industry, Position};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn company(cash: i64) -> CompanyEntity {
    CompanyEntity::new("Crew Co", Industry::Manufacturing, "founder", today(), cash)
}

fn candidate(salary: i64) -> Candidate {
    Candidate {
        name: "Sam Roe".to_string(),
        position: Position::Assistant,
        salary,
        performance: 60.0,
        experience: 2.0,
        leadership: 45.0,
        innovation: 50.0,
        special_skills: Default::default(),
    }
}

#[test]
fn hire_and_fire_round_trip_keeps_cash_accounted() {
    let config = BalanceConfig::default();
    let mut rng = GameRng::new(42);
    let mut c = company(100_000_000);

    let id = workforce::hire(&mut c, candidate(500_000), today(), &config).unwrap();
    assert_eq!(c.company_cash(), 100_000_000 - 3 * 500_000);

    let severance = workforce::fire(&mut c, id, &mut rng, &config).unwrap();
    assert!((500_000..=1_500_000).contains(&severance));
    assert_eq!(c.company_cash(), 100_000_000 - 3 * 500_000 - severance);
    assert_eq!(c.headcount(), 0);
    assert_eq!(c.metrics().employees, 0);
}

#[test]
fn severance_always_within_configured_months() {
    let config = BalanceConfig::default();
    for seed in 1..200u64 {
        let mut rng = GameRng::new(seed);
        let mut c = company(1_000_000_000);
        let id = workforce::hire(&mut c, candidate(700_000), today(), &config).unwrap();
        let severance = workforce::fire(&mut c, id, &mut rng, &config).unwrap();
        let months = severance / 700_000;
        assert!(
            (config.severance_months_min..=config.severance_months_max).contains(&months),
            "severance {} months out of range",
            months
        );
        assert_eq!(severance % 700_000, 0);
    }
}

#[test]
fn expansion_derives_senior_tiers_only_at_scale() {
    let config = BalanceConfig::default();
    let mut rng = GameRng::new(7);
    let mut small = company(10_000_000_000);

    let report = batch_expand(&mut small, 500_000_000, None, today(), &mut rng, &config).unwrap();
    assert!(report.hired > 0);
    // First bracket plans no directors or vice presidents
    assert!(report
        .positions
        .iter()
        .all(|(p, _)| *p < Position::Director));
}

#[test]
fn monthly_cycle_keeps_cash_non_negative() {
    let config = BalanceConfig::default();
    let mut rng = GameRng::new(99);
    let mut c = company(50_000_000);
    for _ in 0..10 {
        workforce::hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
    }

    for _ in 0..36 {
        workforce::run_payroll(&mut c);
        workforce::drift_performance(&mut c, &mut rng);
        workforce::natural_attrition(&mut c, &mut rng, &config);
        assert!(c.company_cash() >= 0);
        assert_eq!(c.metrics().employees as usize, c.headcount());
    }
}

#[test]
fn performance_drift_stays_clamped() {
    let config = BalanceConfig::default();
    let mut rng = GameRng::new(5);
    let mut c = company(1_000_000_000);
    for _ in 0..20 {
        workforce::hire(&mut c, candidate(500_000), today(), &config).unwrap();
    }
    for _ in 0..120 {
        workforce::drift_performance(&mut c, &mut rng);
    }
    for member in c.staff() {
        assert!((0.0..=100.0).contains(&member.performance));
    }
}

proptest! {
    /// Batch expansion is all-or-nothing: either the report's accounting
    /// matches the state change exactly, or nothing changed at all.
    #[test]
    fn batch_expand_is_atomic(
        seed in 1u64..10_000,
        cash in 0i64..2_000_000_000,
        budget in -1_000_000i64..2_000_000_000,
        engineers in 0u32..30,
        interns in 0u32..30,
    ) {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(seed);
        let mut c = company(cash);
        let headcount_before = c.headcount();

        let targets = vec![(Position::Engineer, engineers), (Position::Intern, interns)];
        match batch_expand(&mut c, budget, Some(targets), today(), &mut rng, &config) {
            Ok(report) => {
                prop_assert_eq!(c.headcount(), headcount_before + report.hired as usize);
                prop_assert_eq!(c.company_cash(), cash - report.total_cost);
                prop_assert!(report.total_cost <= budget);
                prop_assert!(c.company_cash() >= 0);
            }
            Err(_) => {
                prop_assert_eq!(c.headcount(), headcount_before);
                prop_assert_eq!(c.company_cash(), cash);
            }
        }
    }

    /// Generated candidates always price within the ability band of their
    /// tier's base salary.
    #[test]
    fn candidate_salaries_track_base(seed in 1u64..5_000) {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(seed);
        for position in Position::ALL {
            let c = workforce::generate_candidate(position, &mut rng, &config);
            let base = config.base_salary(position) as f64;
            prop_assert!(c.salary as f64 >= base * 0.9 - 1.0);
            prop_assert!(c.salary as f64 <= base * 1.2 + 1.0);
        }
    }
}

#[test]
fn overlarge_explicit_batch_is_rejected_whole() {
    let config = BalanceConfig::default();
    let mut rng = GameRng::new(3);
    let mut c = company(i64::MAX / 8);
    let err = batch_expand(
        &mut c,
        i64::MAX / 8,
        Some(vec![(Position::Intern, 51)]),
        today(),
        &mut rng,
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, WorkforceError::BatchTooLarge { .. }));
    assert_eq!(c.headcount(), 0);
}
