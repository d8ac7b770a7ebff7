//! Headless demo driver for the company simulation engine.
//!
//! Runs a scripted founder scenario against a save file so the full
//! engine surface (lifecycle, workforce, development, capital markets,
//! persistence) can be exercised and inspected without a game frontend.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use venture_simulator_core::{
    BalanceConfig, CompanyManager, DevelopmentKind, InMemoryLedger, InMemoryMarketDirectory,
    Industry, Position, StorageManager,
};

const FOUNDER: &str = "demo-founder";

struct Args {
    save_path: String,
    seed: u64,
    months: u32,
}

fn parse_args() -> Args {
    let mut args = Args {
        save_path: "venture_save.json".to_string(),
        seed: 42,
        months: 6,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save" => {
                if let Some(v) = it.next() {
                    args.save_path = v;
                }
            }
            "--seed" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = v;
                }
            }
            "--months" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.months = v;
                }
            }
            _ => {}
        }
    }
    args
}

fn dollars(cents: i64) -> String {
    format!("${:.2}", cents as f64 / 100.0)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(save = %args.save_path, seed = args.seed, months = args.months, "starting demo");

    // The founder starts with $50M in personal cash
    let mut manager = CompanyManager::new(
        StorageManager::new(&args.save_path),
        Box::new(InMemoryLedger::with_balance(FOUNDER, 5_000_000_000)),
        Box::new(InMemoryMarketDirectory::new()),
        BalanceConfig::default(),
        args.seed,
    )
    .context("failed to load the save file")?;

    let existing = manager
        .companies_of(FOUNDER)
        .first()
        .map(|c| (c.company_id(), c.name().to_string()));
    let company_id = match existing {
        Some((id, name)) => {
            info!(company = %name, "resuming existing company");
            id
        }
        None => {
            let id = manager
                .create_company(FOUNDER, "Demo Dynamics", Industry::Technology, 2_000_000_000)
                .context("company creation failed")?;
            info!(company_id = %id, "founded Demo Dynamics with $20M");
            id
        }
    };

    // Build out a starting team
    let report = manager.expand_workforce(FOUNDER, company_id, 200_000_000, None)?;
    info!(
        hired = report.hired,
        cost = %dollars(report.total_cost),
        "initial recruitment drive"
    );
    manager.hire_staff(FOUNDER, company_id, Position::Manager)?;

    // A few quarters of operations
    for month in 1..=args.months {
        let kind = match month % 3 {
            0 => DevelopmentKind::Marketing,
            1 => DevelopmentKind::ResearchAndDevelopment,
            _ => DevelopmentKind::StaffTraining,
        };
        match manager.develop(FOUNDER, company_id, kind) {
            Ok(outcome) => info!(month, action = %outcome.kind, "{}", outcome.summary),
            Err(err) => info!(month, %err, "development skipped"),
        }

        let ticks = manager.monthly_tick(FOUNDER)?;
        for tick in &ticks {
            info!(
                month,
                payroll = %dollars(tick.payroll.paid_total),
                unpaid = tick.payroll.unpaid,
                departed = tick.attrition.departed,
                "month closed"
            );
        }

        let check = manager.check_upgrade(company_id)?;
        if check.eligible {
            let stage = manager.upgrade_stage(FOUNDER, company_id)?;
            info!(month, %stage, "stage upgrade");
        }
    }

    let company = manager.company(company_id)?;
    println!("== {} ==", company.name());
    println!("stage:        {}", company.stage());
    println!("staff:        {}", company.headcount());
    println!("cash:         {}", dollars(company.company_cash()));
    println!("revenue:      {}", dollars(company.metrics().revenue));
    println!("performance:  {:.1}", company.performance_score());
    println!("founder cash: {}", dollars(manager.ledger_balance(FOUNDER)));
    for event in company.news().events() {
        println!("news: [{}] {}", event.publish_date.format("%Y-%m-%d"), event.title);
    }

    let stats = manager.statistics();
    info!(
        companies = stats.total_companies,
        employees = stats.total_employees,
        "world statistics"
    );
    manager.save()?;
    Ok(())
}
