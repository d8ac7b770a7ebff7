//! Capital markets: IPO, secondary offerings, and voluntary delisting.
//!
//! This module owns every transition of the public-market fields on a
//! company. Listings are mirrored into a [`MarketDirectory`], the seam to
//! the exchange simulation that lives outside this crate.
//!
//! # Critical Invariants
//!
//! - IPO proceeds strengthen the asset base; they do not land in the
//!   spendable cash account
//! - Dilution repricing conserves value: the new price is the old market
//!   cap plus confidence-weighted proceeds over the enlarged float
//! - Delisting pays from cash first and the asset base second, and fails
//!   closed when both together cannot cover the buyback and fee

use crate::config::BalanceConfig;
use crate::models::company::{CompanyEntity, Stage};
use crate::models::news::{ImpactKind, NewsCategory};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors from capital market operations.
#[derive(Debug, Error, PartialEq)]
pub enum CapitalError {
    #[error("{name} is already publicly traded")]
    AlreadyPublic { name: String },

    #[error("{name} is not publicly traded")]
    NotPublic { name: String },

    #[error("Invalid ticker symbol {symbol:?}: 1 to 5 ASCII letters required")]
    InvalidSymbol { symbol: String },

    #[error("Ticker symbol {symbol} is already in use")]
    SymbolTaken { symbol: String },

    #[error("{stage}-stage companies cannot list; grow past seed first")]
    StageTooEarly { stage: Stage },

    #[error("Annual revenue {actual} below the listing minimum {required}")]
    RevenueBelowMinimum { required: i64, actual: i64 },

    #[error("Profit must be positive to list, currently {profit}")]
    NotProfitable { profit: i64 },

    #[error("Headcount {actual} below the listing minimum {required}")]
    StaffBelowMinimum { required: usize, actual: usize },

    #[error("Share price must be positive, got {price}")]
    InvalidPrice { price: i64 },

    #[error("Share count must be positive")]
    InvalidShareCount,

    #[error("Offer price {price} outside the allowed band {min} to {max}")]
    PriceOutsideBand { price: i64, min: i64, max: i64 },

    #[error("Offering of {requested} shares exceeds the cap of {cap}")]
    SharesExceedCap { requested: u64, cap: u64 },

    #[error("Insufficient funds to delist: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },
}

/// A listing as mirrored to the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub symbol: String,
    pub price: i64,
    pub shares: u64,
}

/// Seam to the stock market simulation. The engine only needs to announce
/// listings, price moves, and removals; quoting and trading live elsewhere.
pub trait MarketDirectory {
    fn register_listing(&mut self, company_id: Uuid, listing: Listing);
    fn update_listing(&mut self, company_id: Uuid, price: i64, shares: u64);
    fn remove_listing(&mut self, company_id: Uuid);
    fn listing(&self, company_id: Uuid) -> Option<&Listing>;
}

/// Directory backed by a plain map. The default for tests and the headless
/// demo; a full game wires a real exchange in behind the trait.
#[derive(Debug, Default)]
pub struct InMemoryMarketDirectory {
    listings: HashMap<Uuid, Listing>,
}

impl InMemoryMarketDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl MarketDirectory for InMemoryMarketDirectory {
    fn register_listing(&mut self, company_id: Uuid, listing: Listing) {
        self.listings.insert(company_id, listing);
    }

    fn update_listing(&mut self, company_id: Uuid, price: i64, shares: u64) {
        if let Some(listing) = self.listings.get_mut(&company_id) {
            listing.price = price;
            listing.shares = shares;
        }
    }

    fn remove_listing(&mut self, company_id: Uuid) {
        self.listings.remove(&company_id);
    }

    fn listing(&self, company_id: Uuid) -> Option<&Listing> {
        self.listings.get(&company_id)
    }
}

/// Outcome of a completed IPO.
#[derive(Debug, Clone, PartialEq)]
pub struct IpoReport {
    pub symbol: String,
    pub price: i64,
    pub shares: u64,
    /// Gross proceeds, booked into the asset base (cents)
    pub proceeds: i64,
}

/// Outcome of a completed secondary offering.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferingReport {
    /// Gross proceeds credited to cash and assets (cents)
    pub proceeds: i64,
    /// Market reception factor applied to the repricing
    pub confidence: f64,
    pub new_price: i64,
    pub new_shares_outstanding: u64,
}

/// Cost breakdown for a contemplated delisting.
#[derive(Debug, Clone, PartialEq)]
pub struct DelistQuote {
    /// Shareholder buyback (cents)
    pub buyback_cost: i64,
    /// Administrative fee (cents)
    pub fee: i64,
    pub total_cost: i64,
    /// Cash plus asset base covers the total
    pub affordable: bool,
}

/// Outcome of a completed delisting.
#[derive(Debug, Clone, PartialEq)]
pub struct DelistReport {
    pub total_cost: i64,
    /// Portion paid from the cash account (cents)
    pub paid_from_cash: i64,
    /// Portion covered by liquidating assets (cents)
    pub paid_from_assets: i64,
}

fn normalize_symbol(symbol: &str) -> Result<String, CapitalError> {
    let trimmed = symbol.trim();
    let valid = (1..=5).contains(&trimmed.len())
        && trimmed.chars().all(|c| c.is_ascii_alphabetic());
    if !valid {
        return Err(CapitalError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(trimmed.to_uppercase())
}

/// Check every IPO precondition without changing state. `symbol_in_use`
/// reflects a registry-wide uniqueness check done by the caller.
pub fn can_go_public(
    company: &CompanyEntity,
    symbol: &str,
    price: i64,
    shares: u64,
    symbol_in_use: bool,
    config: &BalanceConfig,
) -> Result<String, CapitalError> {
    if company.is_public() {
        return Err(CapitalError::AlreadyPublic {
            name: company.name().to_string(),
        });
    }
    let symbol = normalize_symbol(symbol)?;
    if symbol_in_use {
        return Err(CapitalError::SymbolTaken { symbol });
    }
    if company.stage() == Stage::Seed {
        return Err(CapitalError::StageTooEarly {
            stage: company.stage(),
        });
    }
    if company.metrics().revenue < config.ipo_min_revenue {
        return Err(CapitalError::RevenueBelowMinimum {
            required: config.ipo_min_revenue,
            actual: company.metrics().revenue,
        });
    }
    if company.metrics().profit <= 0 {
        return Err(CapitalError::NotProfitable {
            profit: company.metrics().profit,
        });
    }
    if company.headcount() < config.ipo_min_staff {
        return Err(CapitalError::StaffBelowMinimum {
            required: config.ipo_min_staff,
            actual: company.headcount(),
        });
    }
    if price <= 0 {
        return Err(CapitalError::InvalidPrice { price });
    }
    if shares == 0 {
        return Err(CapitalError::InvalidShareCount);
    }
    Ok(symbol)
}

/// Take the company public.
///
/// Proceeds (`price * shares`) are booked into the asset base rather than
/// the cash account: the raise capitalizes the company, it is not a slush
/// fund. The transition is one-way; a delisted company may list again later
/// as a fresh IPO.
pub fn go_public(
    company: &mut CompanyEntity,
    symbol: &str,
    price: i64,
    shares: u64,
    symbol_in_use: bool,
    today: NaiveDate,
    config: &BalanceConfig,
    market: &mut dyn MarketDirectory,
) -> Result<IpoReport, CapitalError> {
    let symbol = can_go_public(company, symbol, price, shares, symbol_in_use, config)?;

    let proceeds = price.saturating_mul(shares as i64);
    company.metrics_mut().assets += proceeds;
    company.mark_public(symbol.clone(), price, shares, today);
    market.register_listing(
        company.company_id(),
        Listing {
            symbol: symbol.clone(),
            price,
            shares,
        },
    );
    company.push_news(
        format!("{} goes public as {}", company.name(), symbol),
        format!(
            "Listed {} shares at {} per share, raising {} for the asset base.",
            shares, price, proceeds
        ),
        ImpactKind::Positive,
        0.8,
        NewsCategory::Funding,
    );
    info!(
        company = company.name(),
        symbol, price, shares, proceeds, "IPO completed"
    );

    Ok(IpoReport {
        symbol,
        price,
        shares,
        proceeds,
    })
}

/// Issue new shares into the market.
///
/// The offer price must sit within the configured band around the current
/// price and the share count under the cap relative to the current float.
/// `confidence` is the market's reception (drawn by the orchestrator);
/// proceeds land in cash and assets in full, but only the confidence-weighted
/// portion counts toward the repriced market cap, so a cold market means the
/// post-offering price dilutes below the pre-offering price.
pub fn secondary_offering(
    company: &mut CompanyEntity,
    price: i64,
    shares: u64,
    confidence: f64,
    config: &BalanceConfig,
    market: &mut dyn MarketDirectory,
) -> Result<OfferingReport, CapitalError> {
    if !company.is_public() {
        return Err(CapitalError::NotPublic {
            name: company.name().to_string(),
        });
    }
    if shares == 0 {
        return Err(CapitalError::InvalidShareCount);
    }

    let current = company.stock_price();
    let min = (current as f64 * (1.0 - config.offering_price_band)) as i64;
    let max = (current as f64 * (1.0 + config.offering_price_band)) as i64;
    if price < min || price > max {
        return Err(CapitalError::PriceOutsideBand { price, min, max });
    }

    let cap = (company.shares_outstanding() as f64 * config.offering_share_cap) as u64;
    if shares > cap {
        return Err(CapitalError::SharesExceedCap {
            requested: shares,
            cap,
        });
    }

    let proceeds = price.saturating_mul(shares as i64);
    let old_cap = company.market_cap();
    let total_shares = company.shares_outstanding() + shares;
    let new_price =
        ((old_cap as f64 + proceeds as f64 * confidence) / total_shares as f64).round() as i64;

    company.credit_cash(proceeds);
    company.metrics_mut().assets += proceeds;
    company.set_shares_outstanding(total_shares);
    company.set_stock_price(new_price);
    market.update_listing(company.company_id(), new_price, total_shares);
    company.push_news(
        format!("{} raises capital in a secondary offering", company.name()),
        format!(
            "Issued {} new shares at {}, raising {}; shares now trade at {}.",
            shares, price, proceeds, new_price
        ),
        if new_price >= current {
            ImpactKind::Positive
        } else {
            ImpactKind::Neutral
        },
        0.4,
        NewsCategory::Funding,
    );
    info!(
        company = company.name(),
        shares, price, proceeds, new_price, "secondary offering completed"
    );

    Ok(OfferingReport {
        proceeds,
        confidence,
        new_price,
        new_shares_outstanding: total_shares,
    })
}

/// Quote the cost of going private at the current market cap. Read-only.
pub fn delist_preview(
    company: &CompanyEntity,
    config: &BalanceConfig,
) -> Result<DelistQuote, CapitalError> {
    if !company.is_public() {
        return Err(CapitalError::NotPublic {
            name: company.name().to_string(),
        });
    }
    let cap = company.market_cap();
    let buyback_cost = (cap as f64 * config.delist_buyback_rate) as i64;
    let fee = (cap as f64 * config.delist_fee_rate) as i64;
    let total_cost = buyback_cost + fee;
    let affordable = company.company_cash() + company.equity() >= total_cost;
    Ok(DelistQuote {
        buyback_cost,
        fee,
        total_cost,
        affordable,
    })
}

/// Go private: buy back shares at the configured rate of market cap plus an
/// administrative fee.
///
/// Payment drains the cash account first; any remainder liquidates assets.
/// When cash plus equity cannot cover it, nothing changes, so a company
/// carrying heavy liabilities cannot buy itself out on leverage. The
/// ticker symbol is kept on the entity for history.
pub fn confirm_delist(
    company: &mut CompanyEntity,
    config: &BalanceConfig,
    market: &mut dyn MarketDirectory,
) -> Result<DelistReport, CapitalError> {
    let quote = delist_preview(company, config)?;
    if !quote.affordable {
        return Err(CapitalError::InsufficientFunds {
            required: quote.total_cost,
            available: company.company_cash() + company.equity(),
        });
    }

    let paid_from_cash = quote.total_cost.min(company.company_cash());
    let paid_from_assets = quote.total_cost - paid_from_cash;
    if paid_from_cash > 0 {
        // Covered by the preview check
        company
            .debit_cash(paid_from_cash)
            .map_err(|_| CapitalError::InsufficientFunds {
                required: quote.total_cost,
                available: company.company_cash(),
            })?;
    }
    if paid_from_assets > 0 {
        company.metrics_mut().assets -= paid_from_assets;
    }

    market.remove_listing(company.company_id());
    company.mark_private();
    company.push_news(
        format!("{} goes private", company.name()),
        format!(
            "Bought back all public shares for {} including fees.",
            quote.total_cost
        ),
        ImpactKind::Neutral,
        0.5,
        NewsCategory::Market,
    );
    info!(
        company = company.name(),
        total = quote.total_cost,
        paid_from_cash,
        paid_from_assets,
        "delisting completed"
    );

    Ok(DelistReport {
        total_cost: quote.total_cost,
        paid_from_cash,
        paid_from_assets,
    })
}
