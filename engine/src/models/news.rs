//! Per-company news/event log.
//!
//! Every engine operation that changes a company's story (upgrade, IPO,
//! acquisition, departure shock, ...) appends a news event. The log is a
//! bounded ring buffer: only the most recent [`MAX_NEWS_EVENTS`] entries are
//! kept, so a long-running save file cannot grow without bound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ring buffer capacity for a single company's news log.
pub const MAX_NEWS_EVENTS: usize = 50;

/// Direction of a news event's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactKind {
    Positive,
    Negative,
    Neutral,
}

/// Coarse category used by the presentation layer for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Milestone,
    Funding,
    Workforce,
    Market,
    Deal,
    Operations,
}

/// One news entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    /// Unique within the company, monotonically increasing
    pub news_id: u64,
    pub title: String,
    pub content: String,
    pub impact_type: ImpactKind,
    /// Relative magnitude of the impact, in [0, 1]
    pub impact_magnitude: f64,
    pub publish_date: DateTime<Utc>,
    pub category: NewsCategory,
}

/// Bounded, most-recent-last news log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewsLog {
    next_id: u64,
    events: VecDeque<NewsEvent>,
}

impl NewsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, evicting the oldest entry once the buffer is full.
    pub fn publish(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        impact_type: ImpactKind,
        impact_magnitude: f64,
        category: NewsCategory,
    ) {
        let event = NewsEvent {
            news_id: self.next_id,
            title: title.into(),
            content: content.into(),
            impact_type,
            impact_magnitude: impact_magnitude.clamp(0.0, 1.0),
            publish_date: Utc::now(),
            category,
        };
        self.next_id += 1;
        self.events.push_back(event);
        while self.events.len() > MAX_NEWS_EVENTS {
            self.events.pop_front();
        }
    }

    /// Events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &NewsEvent> {
        self.events.iter()
    }

    /// Most recent event, if any.
    pub fn latest(&self) -> Option<&NewsEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
