//! Company registry and ownership index.
//!
//! One owned repository object instead of ambient global state: constructed
//! at startup (usually by the storage layer), handed by reference to the
//! engines, and the single source of truth for which user owns which company.
//!
//! # Critical Invariants
//!
//! 1. Every company id in the ownership index exists in the companies map
//! 2. Each company appears under exactly one user (ownership is exclusive)
//! 3. Ticker symbols are unique among public companies

use crate::models::company::CompanyEntity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// All companies plus the user → companies ownership index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRegistry {
    companies: HashMap<Uuid, CompanyEntity>,
    user_companies: HashMap<String, Vec<Uuid>>,
}

impl CompanyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a company, recording ownership for its creating user.
    pub fn insert(&mut self, company: CompanyEntity) {
        let id = company.company_id();
        let owner = company.created_by_user().to_string();
        self.companies.insert(id, company);
        let owned = self.user_companies.entry(owner).or_default();
        if !owned.contains(&id) {
            owned.push(id);
        }
    }

    /// Remove a company and its ownership entry. Used by acquisition, sale,
    /// and close; the id is never handed out again.
    pub fn remove(&mut self, company_id: Uuid) -> Option<CompanyEntity> {
        let company = self.companies.remove(&company_id)?;
        if let Some(owned) = self.user_companies.get_mut(company.created_by_user()) {
            owned.retain(|id| *id != company_id);
            if owned.is_empty() {
                self.user_companies.remove(company.created_by_user());
            }
        }
        Some(company)
    }

    pub fn get(&self, company_id: Uuid) -> Option<&CompanyEntity> {
        self.companies.get(&company_id)
    }

    pub fn get_mut(&mut self, company_id: Uuid) -> Option<&mut CompanyEntity> {
        self.companies.get_mut(&company_id)
    }

    pub fn is_owner(&self, user_id: &str, company_id: Uuid) -> bool {
        self.user_companies
            .get(user_id)
            .map(|owned| owned.contains(&company_id))
            .unwrap_or(false)
    }

    pub fn companies(&self) -> impl Iterator<Item = &CompanyEntity> {
        self.companies.values()
    }

    pub fn companies_of(&self, user_id: &str) -> Vec<&CompanyEntity> {
        self.user_companies
            .get(user_id)
            .map(|owned| owned.iter().filter_map(|id| self.companies.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn ownership_index(&self) -> &HashMap<String, Vec<Uuid>> {
        &self.user_companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// True if any public company already trades under `symbol`.
    pub fn symbol_taken(&self, symbol: &str) -> bool {
        self.companies
            .values()
            .any(|c| c.is_public() && c.symbol() == Some(symbol))
    }

    /// Resolve a user-supplied identifier to a company.
    ///
    /// Precedence, first match wins:
    /// 1. exact company id
    /// 2. case-insensitive company id
    /// 3. exact ticker symbol (case-insensitive)
    /// 4. fuzzy name (case-insensitive substring)
    /// 5. partial symbol (prefix)
    pub fn find_by_identifier(&self, query: &str) -> Option<&CompanyEntity> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Ok(id) = Uuid::parse_str(query) {
            if let Some(company) = self.companies.get(&id) {
                return Some(company);
            }
        }

        let lowered = query.to_lowercase();
        if let Some(company) = self
            .companies
            .values()
            .find(|c| c.company_id().to_string().to_lowercase() == lowered)
        {
            return Some(company);
        }

        let upper = query.to_uppercase();
        if let Some(company) = self
            .companies
            .values()
            .find(|c| c.symbol() == Some(upper.as_str()))
        {
            return Some(company);
        }

        if let Some(company) = self
            .companies
            .values()
            .find(|c| c.name().to_lowercase().contains(&lowered))
        {
            return Some(company);
        }

        self.companies
            .values()
            .find(|c| c.symbol().map(|s| s.starts_with(&upper)).unwrap_or(false))
    }
}
