//! Stage progression.
//!
//! [`check_upgrade`] evaluates the gates for the single next stage in
//! sequence; [`execute_upgrade`] applies the transition side effects.
//! Ineligibility is a normal business outcome reported as a value, never an
//! error. `execute_upgrade` is not idempotent (bonuses would compound), so
//! the orchestrator re-checks eligibility immediately before every execute.

use crate::config::BalanceConfig;
use crate::models::company::{CompanyEntity, Stage};
use crate::models::news::{ImpactKind, NewsCategory};
use chrono::NaiveDate;
use tracing::info;

/// Outcome of an upgrade eligibility check.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeCheck {
    pub eligible: bool,
    /// User-facing reason: the first failing gate, or a confirmation
    pub reason: String,
    /// The stage the company would advance to, when one exists
    pub next_stage: Option<Stage>,
}

impl UpgradeCheck {
    fn ineligible(reason: impl Into<String>, next_stage: Option<Stage>) -> Self {
        Self {
            eligible: false,
            reason: reason.into(),
            next_stage,
        }
    }
}

/// Evaluate the six gates for the company's next stage.
///
/// Gates: minimum revenue, minimum actual headcount, minimum performance
/// score, minimum market share, maximum debt ratio, minimum age, plus the
/// special condition score threshold. All must pass simultaneously.
pub fn check_upgrade(
    company: &CompanyEntity,
    config: &BalanceConfig,
    today: NaiveDate,
) -> UpgradeCheck {
    let Some(next) = company.stage().next() else {
        return UpgradeCheck::ineligible(
            format!("{} is already at the final stage", company.name()),
            None,
        );
    };
    let Some(req) = config.stage_requirement(next) else {
        return UpgradeCheck::ineligible(
            format!("no requirements configured for stage {}", next),
            Some(next),
        );
    };

    let metrics = company.metrics();
    if metrics.revenue < req.min_revenue {
        return UpgradeCheck::ineligible(
            format!(
                "revenue {} below required {} for {}",
                metrics.revenue, req.min_revenue, next
            ),
            Some(next),
        );
    }
    // Actual roster length, not the cached employees field
    if company.headcount() < req.min_staff {
        return UpgradeCheck::ineligible(
            format!(
                "headcount {} below required {} for {}",
                company.headcount(),
                req.min_staff,
                next
            ),
            Some(next),
        );
    }
    if company.performance_score() < req.min_performance {
        return UpgradeCheck::ineligible(
            format!(
                "performance score {:.1} below required {:.1} for {}",
                company.performance_score(),
                req.min_performance,
                next
            ),
            Some(next),
        );
    }
    if metrics.market_share < req.min_market_share {
        return UpgradeCheck::ineligible(
            format!(
                "market share {:.3}% below required {:.3}% for {}",
                metrics.market_share * 100.0,
                req.min_market_share * 100.0,
                next
            ),
            Some(next),
        );
    }
    if metrics.debt_ratio > req.max_debt_ratio {
        return UpgradeCheck::ineligible(
            format!(
                "debt ratio {:.2} above allowed {:.2} for {}",
                metrics.debt_ratio, req.max_debt_ratio, next
            ),
            Some(next),
        );
    }
    let age = company.age_days(today);
    if age < req.min_age_days {
        return UpgradeCheck::ineligible(
            format!(
                "company age {} days below required {} for {}",
                age, req.min_age_days, next
            ),
            Some(next),
        );
    }
    let special = company.special_condition_score();
    if special < req.min_special_score {
        return UpgradeCheck::ineligible(
            format!(
                "special condition score {:.1} below required {:.1} for {}",
                special, req.min_special_score, next
            ),
            Some(next),
        );
    }

    UpgradeCheck {
        eligible: true,
        reason: format!("{} qualifies for {}", company.name(), next),
        next_stage: Some(next),
    }
}

/// Apply the upgrade to `next`: one-time revenue bonus, risk relief,
/// performance bump, a news event, and the stage advance itself.
///
/// The caller must have verified eligibility via [`check_upgrade`] for the
/// same target stage; calling twice compounds the bonuses.
pub fn execute_upgrade(company: &mut CompanyEntity, next: Stage, config: &BalanceConfig) {
    let bonus = (company.metrics().revenue as f64 * config.upgrade_revenue_bonus) as i64;
    let relief = config
        .stage_requirement(next)
        .map(|req| req.risk_relief)
        .unwrap_or(0);

    company.metrics_mut().revenue += bonus;
    company.set_risk_level(company.risk_level() as i32 - relief);
    company.set_performance_score(company.performance_score() + config.upgrade_performance_bonus);
    company.push_news(
        format!("{} advances to {}", company.name(), next),
        format!(
            "The company cleared every requirement and moved up to the {} stage, booking a one-time revenue boost of {}.",
            next, bonus
        ),
        ImpactKind::Positive,
        0.6,
        NewsCategory::Milestone,
    );
    company.advance_stage(next);

    info!(
        company = company.name(),
        stage = %next,
        revenue_bonus = bonus,
        "stage upgrade executed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::Industry;

    fn eligible_seed_company(today: NaiveDate) -> (CompanyEntity, BalanceConfig) {
        let config = BalanceConfig::default();
        let founded = today - chrono::Duration::days(60);
        let mut c = CompanyEntity::new("Gate Co", Industry::Retail, "u", founded, 100_000_000);
        {
            let m = c.metrics_mut();
            m.revenue = 20_000_000;
            m.market_share = 0.002;
            m.debt_ratio = 0.10;
            m.growth_rate = 0.10;
        }
        c.set_performance_score(50.0);
        for _ in 0..5 {
            let id = c.allocate_staff_id();
            c.add_staff(crate::workforce::tests_support::member(id));
        }
        (c, config)
    }

    #[test]
    fn all_gates_must_pass() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (mut c, config) = eligible_seed_company(today);

        assert!(check_upgrade(&c, &config, today).eligible);

        // Break exactly one gate at a time
        c.metrics_mut().debt_ratio = 0.95;
        let check = check_upgrade(&c, &config, today);
        assert!(!check.eligible);
        assert!(check.reason.contains("debt ratio"));
        c.metrics_mut().debt_ratio = 0.10;

        c.metrics_mut().revenue = 0;
        assert!(!check_upgrade(&c, &config, today).eligible);
    }

    #[test]
    fn age_gate_counts_days_since_founding() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (c, config) = eligible_seed_company(today);
        let too_soon = c.founded() + chrono::Duration::days(10);
        let check = check_upgrade(&c, &config, too_soon);
        assert!(!check.eligible);
        assert!(check.reason.contains("age"));
    }

    #[test]
    fn upgrade_applies_bonus_and_advances() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (mut c, config) = eligible_seed_company(today);
        let check = check_upgrade(&c, &config, today);
        assert!(check.eligible);

        let revenue_before = c.metrics().revenue;
        execute_upgrade(&mut c, check.next_stage.unwrap(), &config);

        assert_eq!(c.stage(), Stage::Startup);
        assert_eq!(c.metrics().revenue, revenue_before + revenue_before / 10);
        assert!(!c.news().is_empty());
    }

    #[test]
    fn final_stage_reports_ineligible_without_next() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (mut c, config) = eligible_seed_company(today);
        let mut stage = Stage::Seed;
        while let Some(next) = stage.next() {
            c.advance_stage(next);
            stage = next;
        }
        let check = check_upgrade(&c, &config, today);
        assert!(!check.eligible);
        assert_eq!(check.next_stage, None);
    }
}
