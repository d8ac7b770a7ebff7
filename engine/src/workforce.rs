//! Workforce management: hiring, firing, batch expansion, payroll, monthly
//! performance drift, and natural attrition.
//!
//! Every operation here is the sole mutation path for the staff roster, so
//! the headcount invariant (`metrics.employees == staff.len()`) holds after
//! each call. Cash moves and roster changes happen in one operation: the
//! precondition check runs first, then debit + roster change complete without
//! yielding control.
//!
//! # Critical Invariants
//!
//! - Hiring reserves a multi-month payroll deposit atomically with the
//!   roster append; a rejected hire changes nothing
//! - `batch_expand` is all-or-nothing: on failure the roster and cash are
//!   untouched, on success exactly the reported staff and cost applied
//! - Company cash never goes negative

use crate::config::BalanceConfig;
use crate::models::company::{CompanyEntity, CompanyError};
use crate::models::news::{ImpactKind, NewsCategory};
use crate::models::staff::{Position, StaffMember};
use crate::rng::GameRng;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from workforce operations. Each `Display` string is the
/// user-facing rejection reason.
#[derive(Debug, Error, PartialEq)]
pub enum WorkforceError {
    #[error("Roster is full: {max} staff maximum")]
    RosterFull { max: usize },

    #[error("Insufficient company funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("No staff member with id {staff_id}")]
    StaffNotFound { staff_id: u64 },

    #[error("Batch of {requested} exceeds the per-call limit of {max}")]
    BatchTooLarge { requested: usize, max: usize },

    #[error("Estimated cost {estimated} exceeds budget {budget}")]
    BudgetExceeded { estimated: i64, budget: i64 },

    #[error("Budget {budget} cannot fund a single hire")]
    BudgetTooSmall { budget: i64 },
}

impl From<CompanyError> for WorkforceError {
    fn from(err: CompanyError) -> Self {
        match err {
            CompanyError::InsufficientFunds {
                required,
                available,
            } => WorkforceError::InsufficientFunds {
                required,
                available,
            },
            CompanyError::NonPositiveAmount { amount } => WorkforceError::BudgetTooSmall {
                budget: amount,
            },
        }
    }
}

/// A candidate as presented to the player before hiring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub position: Position,
    /// Monthly salary ask (cents): tier base adjusted for ability
    pub salary: i64,
    pub performance: f64,
    pub experience: f64,
    pub leadership: f64,
    pub innovation: f64,
    pub special_skills: BTreeSet<String>,
}

/// Result of a successful batch expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionReport {
    /// Per-tier hire counts, in `Position::ALL` order, zero tiers omitted
    pub positions: Vec<(Position, u32)>,
    pub hired: u32,
    /// Deposit-months payroll actually debited (cents)
    pub total_cost: i64,
    /// The pre-generation estimate the budget was checked against (cents)
    pub estimated_cost: i64,
}

/// Result of a monthly attrition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AttritionReport {
    pub departed: u32,
    /// Departures exceeded the shock threshold and profit was penalized
    pub shock: bool,
}

/// Result of a monthly payroll run.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollReport {
    pub paid_total: i64,
    /// Members whose salary could not be covered this month
    pub unpaid: u32,
}

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Jordan", "Casey", "Morgan", "Riley", "Quinn", "Avery", "Dana", "Jamie",
    "Taylor", "Robin", "Lee", "Drew", "Kim",
];

const LAST_NAMES: &[&str] = &[
    "Kim", "Park", "Chen", "Novak", "Garcia", "Okafor", "Silva", "Haas", "Ito", "Weber",
    "Moreau", "Singh", "Baker", "Fontaine", "Reyes",
];

const SKILL_POOL: &[&str] = &[
    "negotiation", "data-analysis", "public-speaking", "automation", "design", "compliance",
    "mentoring", "localization",
];

/// Generate a candidate for `position`. Salary varies with ability:
/// `base * (0.9 + ability/100 * 0.3)`, so a strong candidate asks up to 20%
/// above base and a weak one accepts 10% below.
pub fn generate_candidate(position: Position, rng: &mut GameRng, config: &BalanceConfig) -> Candidate {
    let first = FIRST_NAMES[rng.range_i64(0, FIRST_NAMES.len() as i64) as usize];
    let last = LAST_NAMES[rng.range_i64(0, LAST_NAMES.len() as i64) as usize];

    let performance = rng.range_f64(40.0, 90.0);
    let leadership = rng.range_f64(20.0, 90.0);
    let innovation = rng.range_f64(20.0, 90.0);
    let ability = (performance + leadership + innovation) / 3.0;

    let base = config.base_salary(position);
    let salary = (base as f64 * (0.9 + ability / 100.0 * 0.3)).round() as i64;

    let mut special_skills = BTreeSet::new();
    if rng.chance(0.35) {
        let skill = SKILL_POOL[rng.range_i64(0, SKILL_POOL.len() as i64) as usize];
        special_skills.insert(skill.to_string());
    }

    Candidate {
        name: format!("{} {}", first, last),
        position,
        salary,
        performance,
        experience: rng.range_f64(0.0, 15.0),
        leadership,
        innovation,
        special_skills,
    }
}

/// A slate of candidates for the hire-by-index command surface.
pub fn generate_candidates(
    position: Position,
    count: usize,
    rng: &mut GameRng,
    config: &BalanceConfig,
) -> Vec<Candidate> {
    (0..count)
        .map(|_| generate_candidate(position, rng, config))
        .collect()
}

/// Hire `candidate` into `company`.
///
/// Preconditions: roster below the hard ceiling, and company cash covering a
/// `hire_deposit_months`-month payroll deposit. The deposit debit and the
/// roster append complete as one operation; on any rejection no state moved.
///
/// Returns the new staff member's id.
pub fn hire(
    company: &mut CompanyEntity,
    candidate: Candidate,
    today: NaiveDate,
    config: &BalanceConfig,
) -> Result<u64, WorkforceError> {
    if company.headcount() >= config.max_staff {
        return Err(WorkforceError::RosterFull {
            max: config.max_staff,
        });
    }

    let deposit = candidate.salary * config.hire_deposit_months;
    if company.company_cash() < deposit {
        return Err(WorkforceError::InsufficientFunds {
            required: deposit,
            available: company.company_cash(),
        });
    }

    company.debit_cash(deposit)?;
    let id = company.allocate_staff_id();
    company.add_staff(StaffMember {
        id,
        name: candidate.name,
        position: candidate.position,
        salary: candidate.salary,
        hire_date: today,
        performance: candidate.performance,
        experience: candidate.experience,
        leadership: candidate.leadership,
        innovation: candidate.innovation,
        special_skills: candidate.special_skills,
    });

    debug!(
        company = company.name(),
        staff_id = id,
        deposit,
        "hired staff member"
    );
    Ok(id)
}

/// Fire staff member `staff_id`, paying severance of 1 to 3 months of that
/// member's salary (drawn from `rng`). Cash is debited and the member
/// removed in the same operation; insufficient cash rejects the fire.
///
/// Returns the severance paid.
pub fn fire(
    company: &mut CompanyEntity,
    staff_id: u64,
    rng: &mut GameRng,
    config: &BalanceConfig,
) -> Result<i64, WorkforceError> {
    let salary = company
        .staff()
        .iter()
        .find(|s| s.id == staff_id)
        .map(|s| s.salary)
        .ok_or(WorkforceError::StaffNotFound { staff_id })?;

    let months = rng.range_i64(config.severance_months_min, config.severance_months_max + 1);
    let severance = salary * months;
    if company.company_cash() < severance {
        return Err(WorkforceError::InsufficientFunds {
            required: severance,
            available: company.company_cash(),
        });
    }

    company.debit_cash(severance)?;
    company.remove_staff(staff_id);
    debug!(
        company = company.name(),
        staff_id, severance, "fired staff member"
    );
    Ok(severance)
}

/// Derive a tier distribution for `total` hires from the ratio row for the
/// company's current headcount. Largest-remainder rounding keeps the counts
/// summing to `total`. Public so an expand-by-headcount command can plan
/// before committing a budget to [`batch_expand`].
pub fn expansion_plan(headcount: usize, total: u32, config: &BalanceConfig) -> Vec<(Position, u32)> {
    let ratios = config.expansion_ratios(headcount);

    let mut counts = [0u32; 7];
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(7);
    let mut assigned = 0u32;
    for (i, ratio) in ratios.iter().enumerate() {
        let exact = *ratio * total as f64;
        counts[i] = exact.floor() as u32;
        assigned += counts[i];
        remainders.push((i, exact - exact.floor()));
    }
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut leftover = total - assigned;
    for (i, _) in remainders {
        if leftover == 0 {
            break;
        }
        counts[i] += 1;
        leftover -= 1;
    }

    Position::ALL
        .iter()
        .zip(counts.iter())
        .filter(|(_, n)| **n > 0)
        .map(|(p, n)| (*p, *n))
        .collect()
}

/// Estimated deposit cost for a tier plan, from the base-salary table.
fn estimate_cost(targets: &[(Position, u32)], config: &BalanceConfig) -> i64 {
    targets
        .iter()
        .map(|(p, n)| config.base_salary(*p) * config.hire_deposit_months * *n as i64)
        .sum()
}

/// Batch expansion: hire many staff in one all-or-nothing operation.
///
/// With no explicit `targets`, the tier plan is derived from the company's
/// current actual headcount via the bracket ratio tables, sized so the
/// base-salary estimate fits `budget`. The whole batch is rejected up front
/// if the estimate exceeds the budget or company cash, and again after
/// candidate generation if the actual ability-adjusted salaries no longer
/// fit. Partial batches are never committed.
pub fn batch_expand(
    company: &mut CompanyEntity,
    budget: i64,
    targets: Option<Vec<(Position, u32)>>,
    today: NaiveDate,
    rng: &mut GameRng,
    config: &BalanceConfig,
) -> Result<ExpansionReport, WorkforceError> {
    if budget <= 0 {
        return Err(WorkforceError::BudgetTooSmall { budget });
    }

    let headroom = config.max_staff.saturating_sub(company.headcount());

    let targets = match targets {
        Some(explicit) => explicit
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .collect::<Vec<_>>(),
        None => {
            // Average deposit cost per hire under the current bracket mix
            let ratios = config.expansion_ratios(company.headcount());
            let avg_cost: f64 = Position::ALL
                .iter()
                .zip(ratios.iter())
                .map(|(p, r)| config.base_salary(*p) as f64 * config.hire_deposit_months as f64 * r)
                .sum();
            let affordable = (budget as f64 / avg_cost).floor() as usize;
            let total = affordable.min(config.max_batch_hire).min(headroom);
            if total == 0 {
                return Err(WorkforceError::BudgetTooSmall { budget });
            }
            expansion_plan(company.headcount(), total as u32, config)
        }
    };

    // Widen before summing so absurd explicit counts reject, not overflow
    let requested_total: u64 = targets.iter().map(|(_, n)| u64::from(*n)).sum();
    if requested_total == 0 {
        return Err(WorkforceError::BudgetTooSmall { budget });
    }
    if requested_total > config.max_batch_hire as u64 {
        return Err(WorkforceError::BatchTooLarge {
            requested: requested_total as usize,
            max: config.max_batch_hire,
        });
    }
    let requested = requested_total as u32;
    if requested as usize > headroom {
        return Err(WorkforceError::RosterFull {
            max: config.max_staff,
        });
    }

    let estimated = estimate_cost(&targets, config);
    if estimated > budget {
        return Err(WorkforceError::BudgetExceeded {
            estimated,
            budget,
        });
    }
    if estimated > company.company_cash() {
        return Err(WorkforceError::InsufficientFunds {
            required: estimated,
            available: company.company_cash(),
        });
    }

    // Generate the actual candidates; per-candidate ability variance means
    // the realized cost can differ from the estimate in either direction.
    let mut batch: Vec<Candidate> = Vec::with_capacity(requested as usize);
    for (position, count) in &targets {
        for _ in 0..*count {
            batch.push(generate_candidate(*position, rng, config));
        }
    }
    let actual: i64 = batch
        .iter()
        .map(|c| c.salary * config.hire_deposit_months)
        .sum();
    if actual > budget {
        return Err(WorkforceError::BudgetExceeded {
            estimated: actual,
            budget,
        });
    }
    if actual > company.company_cash() {
        return Err(WorkforceError::InsufficientFunds {
            required: actual,
            available: company.company_cash(),
        });
    }

    // Commit: single debit, then the whole roster append
    company.debit_cash(actual)?;
    for candidate in batch {
        let id = company.allocate_staff_id();
        company.add_staff(StaffMember {
            id,
            name: candidate.name,
            position: candidate.position,
            salary: candidate.salary,
            hire_date: today,
            performance: candidate.performance,
            experience: candidate.experience,
            leadership: candidate.leadership,
            innovation: candidate.innovation,
            special_skills: candidate.special_skills,
        });
    }

    company.push_news(
        format!("{} hires {} new staff", company.name(), requested),
        format!(
            "A recruitment drive added {} employees across {} tiers for {}.",
            requested,
            targets.len(),
            actual
        ),
        ImpactKind::Positive,
        0.3,
        NewsCategory::Workforce,
    );
    info!(
        company = company.name(),
        hired = requested,
        cost = actual,
        "batch expansion committed"
    );

    Ok(ExpansionReport {
        positions: targets,
        hired: requested,
        total_cost: actual,
        estimated_cost: estimated,
    })
}

/// Monthly payroll: debit each member's salary while cash allows. Members
/// the company cannot pay are counted and take a morale (performance) hit;
/// cash never goes negative.
pub fn run_payroll(company: &mut CompanyEntity) -> PayrollReport {
    let mut paid_total = 0i64;
    let mut unpaid = 0u32;
    let mut unpaid_ids: Vec<u64> = Vec::new();

    let salaries: Vec<(u64, i64)> = company.staff().iter().map(|s| (s.id, s.salary)).collect();
    for (id, salary) in salaries {
        if company.debit_cash(salary).is_ok() {
            paid_total += salary;
        } else {
            unpaid += 1;
            unpaid_ids.push(id);
        }
    }

    for member in company.staff_iter_mut() {
        if unpaid_ids.contains(&member.id) {
            member.performance = (member.performance - 10.0).max(0.0);
        }
    }

    if unpaid > 0 {
        warn!(
            company = company.name(),
            unpaid, "payroll could not cover every salary"
        );
    }
    PayrollReport { paid_total, unpaid }
}

/// Monthly performance drift: a small bounded random walk per member, plus
/// accumulating tenure.
pub fn drift_performance(company: &mut CompanyEntity, rng: &mut GameRng) {
    // Borrow discipline: draw first, then apply
    let drifts: Vec<f64> = company
        .staff()
        .iter()
        .map(|_| rng.range_f64(-4.0, 5.0))
        .collect();
    for (member, drift) in company.staff_iter_mut().zip(drifts) {
        member.performance = (member.performance + drift).clamp(0.0, 100.0);
        member.experience += 1.0 / 12.0;
    }
}

/// Monthly attrition tick.
///
/// Each member's departure probability is the base rate, raised for low
/// performers and raised sharply when cash covers less than two months of
/// payroll. If more than the shock threshold of the pre-tick headcount
/// leaves in one pass, profit takes the departure-shock penalty.
pub fn natural_attrition(
    company: &mut CompanyEntity,
    rng: &mut GameRng,
    config: &BalanceConfig,
) -> AttritionReport {
    let headcount_before = company.headcount();
    if headcount_before == 0 {
        return AttritionReport {
            departed: 0,
            shock: false,
        };
    }

    let payroll = company.monthly_payroll();
    let low_runway = payroll > 0 && company.company_cash() < payroll * 2;

    let mut leavers: Vec<u64> = Vec::new();
    for member in company.staff() {
        let mut rate = config.attrition_base_rate;
        if member.performance < config.attrition_low_perf_cutoff {
            rate += config.attrition_low_perf_rate;
        }
        if low_runway {
            rate += config.attrition_low_runway_rate;
        }
        if rng.chance(rate) {
            leavers.push(member.id);
        }
    }

    for id in &leavers {
        company.remove_staff(*id);
    }

    let departed = leavers.len() as u32;
    let shock = departed as f64 > headcount_before as f64 * config.attrition_shock_threshold;
    if shock {
        // Scale by magnitude so a loss-making company is hurt, not helped
        let penalty =
            (company.metrics().profit.abs() as f64 * config.attrition_shock_profit_penalty) as i64;
        company.metrics_mut().profit -= penalty;
        company.push_news(
            format!("Departure wave hits {}", company.name()),
            format!(
                "{} employees left in a single month; productivity suffered.",
                departed
            ),
            ImpactKind::Negative,
            0.5,
            NewsCategory::Workforce,
        );
        warn!(
            company = company.name(),
            departed, penalty, "departure shock"
        );
    }

    AttritionReport { departed, shock }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// A plain mid-tier staff member for invariant tests elsewhere in the
    /// crate. Id must come from `allocate_staff_id`.
    pub(crate) fn member(id: u64) -> StaffMember {
        StaffMember {
            id,
            name: format!("Staff {}", id),
            position: Position::Engineer,
            salary: 800_000,
            hire_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            performance: 60.0,
            experience: 3.0,
            leadership: 50.0,
            innovation: 50.0,
            special_skills: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::Industry;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn company_with_cash(cash: i64) -> CompanyEntity {
        CompanyEntity::new(
            "WF Co",
            Industry::Technology,
            "user",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            cash,
        )
    }

    fn candidate(salary: i64) -> Candidate {
        Candidate {
            name: "Jane Doe".to_string(),
            position: Position::Engineer,
            salary,
            performance: 70.0,
            experience: 4.0,
            leadership: 50.0,
            innovation: 60.0,
            special_skills: BTreeSet::new(),
        }
    }

    #[test]
    fn hire_reserves_three_month_deposit() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(10_000_000);

        let id = hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        assert_eq!(id, 1);
        assert_eq!(c.company_cash(), 7_000_000);
        assert_eq!(c.metrics().employees, 1);
    }

    #[test]
    fn hire_with_no_cash_changes_nothing() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(0);

        let err = hire(&mut c, candidate(1_000_000), today(), &config).unwrap_err();
        assert!(matches!(err, WorkforceError::InsufficientFunds { .. }));
        assert_eq!(c.headcount(), 0);
        assert_eq!(c.company_cash(), 0);
    }

    #[test]
    fn fire_pays_one_to_three_months() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(7);
        let mut c = company_with_cash(100_000_000);
        let id = hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        let cash_before = c.company_cash();

        let severance = fire(&mut c, id, &mut rng, &config).unwrap();
        assert!(
            (1_000_000..=3_000_000).contains(&severance),
            "severance {} outside 1-3 months",
            severance
        );
        assert_eq!(c.company_cash(), cash_before - severance);
        assert_eq!(c.headcount(), 0);
    }

    #[test]
    fn fire_unknown_staff_is_reported() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(7);
        let mut c = company_with_cash(1_000_000);
        assert_eq!(
            fire(&mut c, 99, &mut rng, &config),
            Err(WorkforceError::StaffNotFound { staff_id: 99 })
        );
    }

    #[test]
    fn batch_expand_is_atomic_on_budget_rejection() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(11);
        let mut c = company_with_cash(5_000_000);

        // Explicit plan whose estimate exceeds the budget
        let targets = vec![(Position::VicePresident, 2u32)];
        let err = batch_expand(&mut c, 1_000_000, Some(targets), today(), &mut rng, &config)
            .unwrap_err();
        assert!(matches!(err, WorkforceError::BudgetExceeded { .. }));
        assert_eq!(c.headcount(), 0);
        assert_eq!(c.company_cash(), 5_000_000);
    }

    #[test]
    fn batch_expand_commits_reported_cost_exactly() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(13);
        let mut c = company_with_cash(1_000_000_000);
        let cash_before = c.company_cash();

        let report = batch_expand(
            &mut c,
            200_000_000,
            Some(vec![(Position::Engineer, 5), (Position::Intern, 3)]),
            today(),
            &mut rng,
            &config,
        )
        .unwrap();

        assert_eq!(report.hired, 8);
        assert_eq!(c.headcount(), 8);
        assert_eq!(c.company_cash(), cash_before - report.total_cost);
        assert_eq!(c.metrics().employees, 8);
    }

    #[test]
    fn batch_expand_respects_per_call_cap() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(17);
        let mut c = company_with_cash(i64::MAX / 4);

        let err = batch_expand(
            &mut c,
            i64::MAX / 4,
            Some(vec![(Position::Intern, config.max_batch_hire as u32 + 1)]),
            today(),
            &mut rng,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, WorkforceError::BatchTooLarge { .. }));
    }

    #[test]
    fn batch_expand_rejects_counts_past_u32() {
        let config = BalanceConfig::default();
        let mut rng = GameRng::new(17);
        let mut c = company_with_cash(i64::MAX / 4);

        // Tier counts whose sum does not fit in u32
        let err = batch_expand(
            &mut c,
            i64::MAX / 4,
            Some(vec![
                (Position::Intern, u32::MAX),
                (Position::Engineer, u32::MAX),
            ]),
            today(),
            &mut rng,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, WorkforceError::BatchTooLarge { .. }));
        assert_eq!(c.headcount(), 0);
    }

    #[test]
    fn derived_targets_match_bracket_and_sum() {
        let config = BalanceConfig::default();
        let targets = expansion_plan(10, 20, &config);
        let total: u32 = targets.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 20);
        // Small-company bracket never plans directors or VPs
        assert!(targets
            .iter()
            .all(|(p, _)| *p < Position::Director));
    }

    #[test]
    fn payroll_never_drives_cash_negative() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(10_000_000);
        for _ in 0..3 {
            hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        }
        // 1M cash left after deposits; only one salary is coverable
        assert_eq!(c.company_cash(), 1_000_000);

        let report = run_payroll(&mut c);
        assert_eq!(report.paid_total, 1_000_000);
        assert_eq!(report.unpaid, 2);
        assert_eq!(c.company_cash(), 0);
    }

    #[test]
    fn attrition_rises_without_runway() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(600_000_000);
        for _ in 0..100 {
            hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        }

        // Healthy company: low departure counts
        let mut rng = GameRng::new(23);
        let mut rich = c.clone();
        rich.credit_cash(10_000_000_000);
        let healthy = natural_attrition(&mut rich, &mut rng, &config);

        // Same roster with under two months of payroll in the bank
        let mut rng = GameRng::new(23);
        let mut poor = c.clone();
        poor.debit_cash(poor.company_cash() - 1_000_000).unwrap();
        let strained = natural_attrition(&mut poor, &mut rng, &config);

        assert!(
            strained.departed > healthy.departed,
            "low runway should raise departures ({} vs {})",
            strained.departed,
            healthy.departed
        );
    }

    #[test]
    fn departure_shock_penalizes_profit() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(60_000_000);
        for _ in 0..10 {
            hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        }
        c.metrics_mut().profit = 100_000_000;
        // Tank performance and runway so departures clear the threshold
        for member in c.staff_iter_mut() {
            member.performance = 5.0;
        }
        c.debit_cash(c.company_cash() - 100).unwrap();

        // Search a few seeds for a shock draw; rates make one very likely
        let mut saw_shock = false;
        for seed in 0..20 {
            let mut clone = c.clone();
            let mut rng = GameRng::new(seed);
            let report = natural_attrition(&mut clone, &mut rng, &config);
            if report.shock {
                saw_shock = true;
                assert!(clone.metrics().profit < 100_000_000);
                break;
            }
        }
        assert!(saw_shock, "no seed produced a departure shock");
    }

    #[test]
    fn departure_shock_deepens_a_loss() {
        let config = BalanceConfig::default();
        let mut c = company_with_cash(60_000_000);
        for _ in 0..10 {
            hire(&mut c, candidate(1_000_000), today(), &config).unwrap();
        }
        c.metrics_mut().profit = -100_000_000;
        for member in c.staff_iter_mut() {
            member.performance = 5.0;
        }
        c.debit_cash(c.company_cash() - 100).unwrap();

        let mut saw_shock = false;
        for seed in 0..20 {
            let mut clone = c.clone();
            let mut rng = GameRng::new(seed);
            let report = natural_attrition(&mut clone, &mut rng, &config);
            if report.shock {
                saw_shock = true;
                assert!(
                    clone.metrics().profit < -100_000_000,
                    "shock must deepen the loss, got {}",
                    clone.metrics().profit
                );
                break;
            }
        }
        assert!(saw_shock, "no seed produced a departure shock");
    }
}
