//! Company manager: the single entry point the presentation layer talks to.
//!
//! Owns the registry, the balance tables, the deterministic RNG, the market
//! directory, the founder's personal ledger, and the storage manager. Every
//! player-visible operation routes through here: ownership is verified, the
//! engine module does the work, and the registry is persisted afterwards.
//!
//! The ledger and market directory are trait objects so a full game can
//! plug its own wallet and exchange in behind the same seams the tests use.

use crate::capital::{
    self, CapitalError, DelistQuote, DelistReport, IpoReport, MarketDirectory, OfferingReport,
};
use crate::config::BalanceConfig;
use crate::models::company::{CompanyEntity, CompanyError, Industry, Stage};
use crate::models::news::{ImpactKind, NewsCategory};
use crate::models::registry::CompanyRegistry;
use crate::models::staff::Position;
use crate::operations::{self, DevelopmentKind, DevelopmentOutcome, OperationsError};
use crate::rng::GameRng;
use crate::stage::{self, UpgradeCheck};
use crate::storage::{registry_statistics, RegistryStatistics, StorageError, StorageManager};
use crate::valuation::{self, AcquisitionQuote, MergeReport, SaleQuote, ValuationError};
use crate::workforce::{
    self, AttritionReport, Candidate, ExpansionReport, PayrollReport, WorkforceError,
};
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors from the founder's personal wallet.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient personal funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },
}

/// Seam to the player's personal cash account, kept outside this crate in
/// a full game. Amounts are i64 cents.
pub trait PersonalLedger {
    fn balance(&self, user_id: &str) -> i64;
    fn withdraw(&mut self, user_id: &str, amount: i64) -> Result<(), LedgerError>;
    fn deposit(&mut self, user_id: &str, amount: i64);
}

/// Map-backed ledger for tests and the headless demo.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<String, i64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(user_id: impl Into<String>, balance: i64) -> Self {
        let mut ledger = Self::new();
        ledger.balances.insert(user_id.into(), balance);
        ledger
    }

    pub fn set_balance(&mut self, user_id: impl Into<String>, balance: i64) {
        self.balances.insert(user_id.into(), balance);
    }
}

impl PersonalLedger for InMemoryLedger {
    fn balance(&self, user_id: &str) -> i64 {
        self.balances.get(user_id).copied().unwrap_or(0)
    }

    fn withdraw(&mut self, user_id: &str, amount: i64) -> Result<(), LedgerError> {
        let balance = self.balance(user_id);
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        self.balances.insert(user_id.to_string(), balance - amount);
        Ok(())
    }

    fn deposit(&mut self, user_id: &str, amount: i64) {
        *self.balances.entry(user_id.to_string()).or_insert(0) += amount;
    }
}

/// Top-level error type surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("No company matches {query:?}")]
    CompanyNotFound { query: String },

    #[error("{user_id} does not own this company")]
    NotOwner { user_id: String },

    #[error("Initial capital must be positive, got {amount}")]
    InvalidCapital { amount: i64 },

    #[error("{name} must delist before this operation")]
    StillPublic { name: String },

    #[error("Not eligible for an upgrade: {reason}")]
    UpgradeIneligible { reason: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Company(#[from] CompanyError),

    #[error(transparent)]
    Workforce(#[from] WorkforceError),

    #[error(transparent)]
    Capital(#[from] CapitalError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Operations(#[from] OperationsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Per-company result of a monthly tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub company_id: Uuid,
    pub payroll: PayrollReport,
    pub attrition: AttritionReport,
}

/// Result of closing a company down.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureReport {
    /// Severance paid to the roster on the way out (cents)
    pub severance_paid: i64,
    /// Liquidation residual returned to the founder (cents)
    pub returned_to_owner: i64,
}

/// The orchestrator. See the module docs.
pub struct CompanyManager {
    registry: CompanyRegistry,
    config: BalanceConfig,
    rng: GameRng,
    ledger: Box<dyn PersonalLedger>,
    market: Box<dyn MarketDirectory>,
    storage: StorageManager,
}

impl CompanyManager {
    /// Load the registry from storage and wire the seams. Listings of
    /// already-public companies are mirrored back into the market directory.
    pub fn new(
        storage: StorageManager,
        ledger: Box<dyn PersonalLedger>,
        mut market: Box<dyn MarketDirectory>,
        config: BalanceConfig,
        seed: u64,
    ) -> Result<Self, ManagerError> {
        let registry = storage.load()?;
        for company in registry.companies() {
            if company.is_public() {
                if let Some(symbol) = company.symbol() {
                    market.register_listing(
                        company.company_id(),
                        capital::Listing {
                            symbol: symbol.to_string(),
                            price: company.stock_price(),
                            shares: company.shares_outstanding(),
                        },
                    );
                }
            }
        }
        Ok(Self {
            registry,
            config,
            rng: GameRng::new(seed),
            ledger,
            market,
            storage,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn registry(&self) -> &CompanyRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn ledger_balance(&self, user_id: &str) -> i64 {
        self.ledger.balance(user_id)
    }

    pub fn statistics(&self) -> RegistryStatistics {
        registry_statistics(&self.registry)
    }

    /// Resolve a user-supplied identifier (id, ticker, or name fragment).
    pub fn resolve(&self, query: &str) -> Result<Uuid, ManagerError> {
        self.registry
            .find_by_identifier(query)
            .map(|c| c.company_id())
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: query.to_string(),
            })
    }

    pub fn company(&self, company_id: Uuid) -> Result<&CompanyEntity, ManagerError> {
        self.registry
            .get(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })
    }

    pub fn companies_of(&self, user_id: &str) -> Vec<&CompanyEntity> {
        self.registry.companies_of(user_id)
    }

    fn require_owner(&self, user_id: &str, company_id: Uuid) -> Result<(), ManagerError> {
        if !self.registry.is_owner(user_id, company_id) {
            return Err(ManagerError::NotOwner {
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), ManagerError> {
        self.storage.save(&self.registry)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Insert an externally built company (scenario seeding, non-player
    /// competitors). No ledger movement; the entity arrives as-is.
    pub fn adopt_company(&mut self, company: CompanyEntity) -> Result<Uuid, ManagerError> {
        let company_id = company.company_id();
        self.registry.insert(company);
        self.persist()?;
        Ok(company_id)
    }

    /// Found a new company, funding it from the founder's personal ledger.
    pub fn create_company(
        &mut self,
        user_id: &str,
        name: &str,
        industry: Industry,
        initial_capital: i64,
    ) -> Result<Uuid, ManagerError> {
        if initial_capital <= 0 {
            return Err(ManagerError::InvalidCapital {
                amount: initial_capital,
            });
        }
        self.ledger.withdraw(user_id, initial_capital)?;
        let company = CompanyEntity::new(
            name,
            industry,
            user_id,
            Utc::now().date_naive(),
            initial_capital,
        );
        let company_id = company.company_id();
        self.registry.insert(company);
        self.persist()?;
        info!(user = user_id, company = name, company_id = %company_id, "company created");
        Ok(company_id)
    }

    /// Inject personal capital into an owned company. The money moves from
    /// the ledger into company cash, grows the asset base, and is recorded
    /// as investment.
    pub fn invest(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        amount: i64,
    ) -> Result<(), ManagerError> {
        if amount <= 0 {
            return Err(ManagerError::InvalidCapital { amount });
        }
        self.require_owner(user_id, company_id)?;
        self.ledger.withdraw(user_id, amount)?;
        let company = self.get_mut(company_id)?;
        company.credit_cash(amount);
        company.record_investment(amount);
        company.metrics_mut().assets += amount;
        self.persist()
    }

    /// Close an owned, private company: severance for the whole roster,
    /// then the liquidation residual returns to the founder.
    pub fn close_company(
        &mut self,
        user_id: &str,
        company_id: Uuid,
    ) -> Result<ClosureReport, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let company = self.company(company_id)?;
        if company.is_public() {
            return Err(ManagerError::StillPublic {
                name: company.name().to_string(),
            });
        }

        let severance = company.monthly_payroll() * self.config.severance_months_max;
        let liquidation = company.company_cash() + company.equity().max(0);
        if liquidation < severance {
            return Err(ManagerError::Company(CompanyError::InsufficientFunds {
                required: severance,
                available: liquidation,
            }));
        }
        let returned = liquidation - severance;
        let name = company.name().to_string();

        self.registry.remove(company_id);
        self.ledger.deposit(user_id, returned);
        self.persist()?;
        info!(user = user_id, company = %name, severance, returned, "company closed");
        Ok(ClosureReport {
            severance_paid: severance,
            returned_to_owner: returned,
        })
    }

    /// Sell an owned company outright at `price`. The price must pass
    /// [`valuation::check_sale_price`]; the roster's severance obligation
    /// comes out of the proceeds, and the founder pockets the rest.
    pub fn sell_company(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        price: i64,
    ) -> Result<SaleQuote, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let company = self.company(company_id)?;
        let quote = valuation::check_sale_price(company, price, &self.config)?;
        let name = company.name().to_string();
        // Non-negative: check_sale_price floors the price at the severance
        let proceeds = price - quote.severance_floor;

        self.registry.remove(company_id);
        self.market.remove_listing(company_id);
        self.ledger.deposit(user_id, proceeds);
        self.persist()?;
        info!(user = user_id, company = %name, price, proceeds, "company sold");
        Ok(quote)
    }

    /// Found a joint venture from two owned parent companies. Each parent
    /// contributes `contribution` in cash; the venture starts with the
    /// combined amount. Both debits are checked before either happens.
    pub fn joint_venture(
        &mut self,
        user_id: &str,
        parent_a: Uuid,
        parent_b: Uuid,
        name: &str,
        industry: Industry,
        contribution: i64,
    ) -> Result<Uuid, ManagerError> {
        if contribution <= 0 {
            return Err(ManagerError::InvalidCapital {
                amount: contribution,
            });
        }
        if parent_a == parent_b {
            return Err(ManagerError::Valuation(ValuationError::SelfAcquisition));
        }
        self.require_owner(user_id, parent_a)?;
        self.require_owner(user_id, parent_b)?;

        for id in [parent_a, parent_b] {
            let parent = self.company(id)?;
            if parent.company_cash() < contribution {
                return Err(ManagerError::Company(CompanyError::InsufficientFunds {
                    required: contribution,
                    available: parent.company_cash(),
                }));
            }
        }

        let mut venture = CompanyEntity::new(
            name,
            industry,
            user_id,
            Utc::now().date_naive(),
            contribution * 2,
        );
        venture.push_news(
            format!("{} launches as a joint venture", name),
            format!("Founded with {} in combined parent funding.", contribution * 2),
            ImpactKind::Positive,
            0.5,
            NewsCategory::Milestone,
        );
        let venture_id = venture.company_id();

        for id in [parent_a, parent_b] {
            let parent = self.get_mut(id)?;
            parent.debit_cash(contribution)?;
            parent.push_news(
                format!("{} co-founds {}", parent.name(), name),
                format!("Contributed {} to launch a joint venture.", contribution),
                ImpactKind::Positive,
                0.4,
                NewsCategory::Deal,
            );
        }
        self.registry.insert(venture);
        self.persist()?;
        info!(user = user_id, venture = name, contribution, "joint venture founded");
        Ok(venture_id)
    }

    // ------------------------------------------------------------------
    // Workforce
    // ------------------------------------------------------------------

    /// Hire one generated candidate for `position`.
    pub fn hire_staff(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        position: Position,
    ) -> Result<u64, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let candidate = workforce::generate_candidate(position, &mut self.rng, &self.config);
        let today = Utc::now().date_naive();
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let staff_id = workforce::hire(company, candidate, today, &self.config)?;
        self.persist()?;
        Ok(staff_id)
    }

    /// Generate a candidate slate for `position`. The caller picks one and
    /// passes it back to [`CompanyManager::hire_candidate`].
    pub fn list_candidates(&mut self, position: Position, count: usize) -> Vec<Candidate> {
        workforce::generate_candidates(position, count, &mut self.rng, &self.config)
    }

    /// Hire a specific candidate from a previously generated slate.
    pub fn hire_candidate(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        candidate: Candidate,
    ) -> Result<u64, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let today = Utc::now().date_naive();
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let staff_id = workforce::hire(company, candidate, today, &self.config)?;
        self.persist()?;
        Ok(staff_id)
    }

    /// Fire a staff member, paying randomized severance.
    pub fn fire_staff(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        staff_id: u64,
    ) -> Result<i64, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let severance = workforce::fire(company, staff_id, &mut self.rng, &self.config)?;
        self.persist()?;
        Ok(severance)
    }

    /// Batch expansion against a budget; see [`workforce::batch_expand`].
    pub fn expand_workforce(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        budget: i64,
        targets: Option<Vec<(Position, u32)>>,
    ) -> Result<ExpansionReport, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let today = Utc::now().date_naive();
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let report =
            workforce::batch_expand(company, budget, targets, today, &mut self.rng, &self.config)?;
        self.persist()?;
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Development
    // ------------------------------------------------------------------

    pub fn develop(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        kind: DevelopmentKind,
    ) -> Result<DevelopmentOutcome, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let outcome = operations::develop(company, kind, &mut self.rng, &self.config)?;
        self.persist()?;
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Capital markets
    // ------------------------------------------------------------------

    pub fn go_public(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        symbol: &str,
        price: i64,
        shares: u64,
    ) -> Result<IpoReport, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let symbol_in_use = self.registry.symbol_taken(&symbol.trim().to_uppercase());
        let today = Utc::now().date_naive();
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let report = capital::go_public(
            company,
            symbol,
            price,
            shares,
            symbol_in_use,
            today,
            &self.config,
            self.market.as_mut(),
        )?;
        self.persist()?;
        Ok(report)
    }

    /// Secondary offering; market reception is drawn from the engine RNG
    /// within the configured confidence range.
    pub fn secondary_offering(
        &mut self,
        user_id: &str,
        company_id: Uuid,
        price: i64,
        shares: u64,
    ) -> Result<OfferingReport, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let confidence = self.rng.range_f64(
            self.config.offering_confidence_min,
            self.config.offering_confidence_max,
        );
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let report = capital::secondary_offering(
            company,
            price,
            shares,
            confidence,
            &self.config,
            self.market.as_mut(),
        )?;
        self.persist()?;
        Ok(report)
    }

    pub fn delist_quote(&self, company_id: Uuid) -> Result<DelistQuote, ManagerError> {
        let company = self.company(company_id)?;
        Ok(capital::delist_preview(company, &self.config)?)
    }

    pub fn delist(
        &mut self,
        user_id: &str,
        company_id: Uuid,
    ) -> Result<DelistReport, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        let report = capital::confirm_delist(company, &self.config, self.market.as_mut())?;
        self.persist()?;
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Stage progression
    // ------------------------------------------------------------------

    pub fn check_upgrade(&self, company_id: Uuid) -> Result<UpgradeCheck, ManagerError> {
        let company = self.company(company_id)?;
        Ok(stage::check_upgrade(
            company,
            &self.config,
            Utc::now().date_naive(),
        ))
    }

    /// Re-check eligibility and advance one stage.
    pub fn upgrade_stage(
        &mut self,
        user_id: &str,
        company_id: Uuid,
    ) -> Result<Stage, ManagerError> {
        self.require_owner(user_id, company_id)?;
        let check = self.check_upgrade(company_id)?;
        let Some(next) = check.next_stage.filter(|_| check.eligible) else {
            return Err(ManagerError::UpgradeIneligible {
                reason: check.reason,
            });
        };
        let company = self
            .registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })?;
        stage::execute_upgrade(company, next, &self.config);
        self.persist()?;
        Ok(next)
    }

    // ------------------------------------------------------------------
    // M&A
    // ------------------------------------------------------------------

    pub fn acquisition_quote(&self, target_id: Uuid) -> Result<AcquisitionQuote, ManagerError> {
        let target = self.company(target_id)?;
        Ok(valuation::evaluate_acquisition(target, &self.config))
    }

    /// Acquire `target_id` into an owned acquirer at the quoted price.
    pub fn acquire(
        &mut self,
        user_id: &str,
        acquirer_id: Uuid,
        target_id: Uuid,
    ) -> Result<MergeReport, ManagerError> {
        self.require_owner(user_id, acquirer_id)?;
        let report = valuation::execute_acquisition(
            &mut self.registry,
            acquirer_id,
            target_id,
            &self.config,
        )?;
        // The target no longer exists; drop its listing if it was public
        self.market.remove_listing(target_id);
        self.persist()?;
        Ok(report)
    }

    pub fn sale_quote(&self, company_id: Uuid) -> Result<SaleQuote, ManagerError> {
        let company = self.company(company_id)?;
        Ok(valuation::evaluate_sale(company, &self.config))
    }

    // ------------------------------------------------------------------
    // Simulation tick
    // ------------------------------------------------------------------

    /// Advance one month for every company of `user_id`: payroll, then
    /// performance drift, then attrition. One save at the end.
    pub fn monthly_tick(&mut self, user_id: &str) -> Result<Vec<TickReport>, ManagerError> {
        let ids: Vec<Uuid> = self
            .registry
            .companies_of(user_id)
            .iter()
            .map(|c| c.company_id())
            .collect();

        let mut reports = Vec::with_capacity(ids.len());
        for company_id in ids {
            let Some(company) = self.registry.get_mut(company_id) else {
                continue;
            };
            let payroll = workforce::run_payroll(company);
            workforce::drift_performance(company, &mut self.rng);
            let attrition = workforce::natural_attrition(company, &mut self.rng, &self.config);
            reports.push(TickReport {
                company_id,
                payroll,
                attrition,
            });
        }
        self.persist()?;
        Ok(reports)
    }

    /// Persist immediately. Mutating operations already save; this is for
    /// shutdown paths.
    pub fn save(&self) -> Result<(), ManagerError> {
        self.persist()
    }

    fn get_mut(&mut self, company_id: Uuid) -> Result<&mut CompanyEntity, ManagerError> {
        self.registry
            .get_mut(company_id)
            .ok_or_else(|| ManagerError::CompanyNotFound {
                query: company_id.to_string(),
            })
    }
}
