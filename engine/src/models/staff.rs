//! Staff roster records.
//!
//! A [`StaffMember`] is created by the workforce hire operations, drifts in
//! performance on the monthly tick, and leaves through fire, attrition, or an
//! acquisition merge. Staff ids are unique per company, monotonically
//! increasing, and never reused; the company entity is the only allocator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Job tier. The set is closed: hiring, salary tables, and expansion ratio
/// tables are all keyed by these seven tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Intern,
    Assistant,
    Engineer,
    SeniorEngineer,
    Manager,
    Director,
    VicePresident,
}

impl Position {
    /// All tiers, junior to senior. Index order matches the expansion ratio
    /// tables in `BalanceConfig`.
    pub const ALL: [Position; 7] = [
        Position::Intern,
        Position::Assistant,
        Position::Engineer,
        Position::SeniorEngineer,
        Position::Manager,
        Position::Director,
        Position::VicePresident,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Position::Intern => "Intern",
            Position::Assistant => "Assistant",
            Position::Engineer => "Engineer",
            Position::SeniorEngineer => "Senior Engineer",
            Position::Manager => "Manager",
            Position::Director => "Director",
            Position::VicePresident => "VP",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A single employee on a company's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique within the company, monotonically increasing, never reused.
    /// Reassigned (renumbered) only when a roster is merged in an acquisition.
    pub id: u64,

    pub name: String,

    pub position: Position,

    /// Monthly salary (cents)
    pub salary: i64,

    pub hire_date: NaiveDate,

    /// Performance rating in [0, 100]; drifts on the monthly tick
    pub performance: f64,

    /// Prior experience in years
    pub experience: f64,

    /// Leadership rating in [0, 100]
    pub leadership: f64,

    /// Innovation rating in [0, 100]
    pub innovation: f64,

    /// Free-form skill tags
    pub special_skills: BTreeSet<String>,
}

impl StaffMember {
    /// Composite ability in [0, 100], used for salary variance at hire time.
    pub fn ability(&self) -> f64 {
        (self.performance + self.leadership + self.innovation) / 3.0
    }
}
