//! Versioned, checksummed persistence for the company registry.
//!
//! Saves are atomic: the document is written to a temporary file in the
//! same directory and renamed over the live file, so a crash mid-write can
//! never leave a truncated save behind. The previous save is kept as a
//! timestamped backup, and a fallback copy is refreshed after every
//! successful save. Loading verifies a SHA-256 checksum over the company
//! payload and walks backups newest-first when the primary is unreadable.
//!
//! Derived company fields (market cap, headcount metric) are re-derived on
//! load rather than trusted from disk.

use crate::models::company::CompanyEntity;
use crate::models::registry::CompanyRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Current save document schema. Older documents load with defaults for
/// fields they predate; newer documents are refused.
pub const SCHEMA_VERSION: u32 = 2;

/// How many timestamped backups to keep around.
const BACKUP_KEEP: usize = 5;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Save checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Save file schema version {version} is newer than supported {supported}")]
    UnsupportedVersion { version: u32, supported: u32 },
}

/// Aggregate statistics computed at save time, stored for dashboards and
/// refreshed on every save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatistics {
    pub total_companies: usize,
    pub public_companies: usize,
    pub total_employees: usize,
    /// Sum of market caps across public companies (cents)
    pub total_market_cap: i64,
    /// Sum of company cash accounts (cents)
    pub total_cash: i64,
}

/// Compute current statistics for `registry`.
pub fn registry_statistics(registry: &CompanyRegistry) -> RegistryStatistics {
    let mut stats = RegistryStatistics::default();
    for company in registry.companies() {
        stats.total_companies += 1;
        if company.is_public() {
            stats.public_companies += 1;
            stats.total_market_cap += company.market_cap();
        }
        stats.total_employees += company.headcount();
        stats.total_cash += company.company_cash();
    }
    stats
}

/// On-disk document. Companies are stored as a vector sorted by id and the
/// ownership index as a sorted map, so serialization is deterministic and
/// the checksum is stable.
#[derive(Debug, Serialize, Deserialize)]
struct SaveDocument {
    version: u32,
    last_updated: DateTime<Utc>,
    /// SHA-256 hex over the serialized `companies` vector
    #[serde(default)]
    checksum: String,
    companies: Vec<CompanyEntity>,
    user_companies: BTreeMap<String, Vec<Uuid>>,
    #[serde(default)]
    statistics: RegistryStatistics,
}

/// File-backed persistence for a [`CompanyRegistry`].
#[derive(Debug, Clone)]
pub struct StorageManager {
    path: PathBuf,
}

impl StorageManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fallback_path(&self) -> PathBuf {
        self.path.with_extension("fallback.json")
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Persist `registry` atomically, rotating a timestamped backup of the
    /// previous save and refreshing the fallback copy.
    pub fn save(&self, registry: &CompanyRegistry) -> Result<(), StorageError> {
        let mut companies: Vec<CompanyEntity> = registry.companies().cloned().collect();
        companies.sort_by_key(|c| c.company_id());
        let mut user_companies: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for (user, owned) in registry.ownership_index() {
            let mut owned = owned.clone();
            owned.sort();
            user_companies.insert(user.clone(), owned);
        }

        let payload = serde_json::to_vec(&companies)?;
        let checksum = hex_digest(&payload);

        let doc = SaveDocument {
            version: SCHEMA_VERSION,
            last_updated: Utc::now(),
            checksum,
            companies,
            user_companies,
            statistics: registry_statistics(registry),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes)?;

        if self.path.exists() {
            let backup = self.backup_path_for_now();
            fs::copy(&self.path, &backup)?;
            self.prune_backups()?;
        }
        fs::rename(&tmp, &self.path)?;
        fs::write(self.fallback_path(), &bytes)?;

        info!(
            path = %self.path.display(),
            companies = doc.companies.len(),
            "registry saved"
        );
        Ok(())
    }

    /// Load the registry. A missing file is an empty registry, not an
    /// error. A corrupt or mismatched primary falls back to the newest
    /// readable backup, then the fallback copy; the original error is
    /// surfaced only when every candidate fails.
    pub fn load(&self) -> Result<CompanyRegistry, StorageError> {
        if !self.path.exists() {
            return Ok(CompanyRegistry::new());
        }
        match self.load_file(&self.path) {
            Ok(registry) => Ok(registry),
            Err(primary_err) => {
                warn!(
                    path = %self.path.display(),
                    error = %primary_err,
                    "primary save unreadable, trying recovery candidates"
                );
                for candidate in self.recovery_candidates() {
                    match self.load_file(&candidate) {
                        Ok(registry) => {
                            warn!(
                                recovered_from = %candidate.display(),
                                "registry recovered from backup"
                            );
                            return Ok(registry);
                        }
                        Err(err) => {
                            warn!(candidate = %candidate.display(), error = %err, "candidate failed");
                        }
                    }
                }
                Err(primary_err)
            }
        }
    }

    fn load_file(&self, path: &Path) -> Result<CompanyRegistry, StorageError> {
        let bytes = fs::read(path)?;
        let doc: SaveDocument = serde_json::from_slice(&bytes)?;

        if doc.version > SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                version: doc.version,
                supported: SCHEMA_VERSION,
            });
        }

        // Pre-checksum documents carry an empty field; nothing to verify
        if !doc.checksum.is_empty() {
            let payload = serde_json::to_vec(&doc.companies)?;
            let actual = hex_digest(&payload);
            if actual != doc.checksum {
                return Err(StorageError::ChecksumMismatch {
                    expected: doc.checksum,
                    actual,
                });
            }
        }

        let mut registry = CompanyRegistry::new();
        for company in doc.companies {
            registry.insert(rehydrate(company));
        }
        Ok(registry)
    }

    fn backup_path_for_now(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
        self.backup_path_for_stamp(&stamp)
    }

    /// Two saves can land in the same millisecond; a fixed-width sequence
    /// keeps the names unique while still sorting chronologically.
    fn backup_path_for_stamp(&self, stamp: &str) -> PathBuf {
        for seq in 0..100 {
            let candidate = self
                .path
                .with_extension(format!("{}{:02}.bak", stamp, seq));
            if !candidate.exists() {
                return candidate;
            }
        }
        self.path.with_extension(format!("{}99.bak", stamp))
    }

    /// Existing backups for this save, newest first.
    fn backups(&self) -> Vec<PathBuf> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            // Bare file name: the save lives in the working directory
            _ => Path::new("."),
        };
        let stem = match self.path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => return Vec::new(),
        };
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&format!("{}.", stem)) && n.ends_with(".bak"))
                    .unwrap_or(false)
            })
            .collect();
        // Timestamped names sort chronologically
        found.sort();
        found.reverse();
        found
    }

    fn recovery_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = self.backups();
        let fallback = self.fallback_path();
        if fallback.exists() {
            candidates.push(fallback);
        }
        candidates
    }

    fn prune_backups(&self) -> Result<(), StorageError> {
        for stale in self.backups().into_iter().skip(BACKUP_KEEP) {
            fs::remove_file(stale)?;
        }
        Ok(())
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Rebuild an entity through the snapshot constructor so derived fields are
/// recomputed instead of trusted from disk.
fn rehydrate(company: CompanyEntity) -> CompanyEntity {
    CompanyEntity::from_snapshot(
        company.company_id(),
        company.name().to_string(),
        company.symbol().map(|s| s.to_string()),
        company.industry(),
        company.stage(),
        company.metrics().clone(),
        company.staff().to_vec(),
        company.next_staff_id(),
        company.company_cash(),
        company.total_investment(),
        company.is_public(),
        company.stock_price(),
        company.shares_outstanding(),
        company.ipo_price(),
        company.ipo_date(),
        company.news().clone(),
        company.performance_score(),
        company.risk_level(),
        company.created_by_user().to_string(),
        company.founded(),
        company.last_updated(),
    )
}
