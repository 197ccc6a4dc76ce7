use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{BrowseSessionRow, CandidateSummary, UserId};

/// Returned by `startBrowsing`: the shortlist is materialized and ready to be walked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistHandle {
    pub viewer_id: UserId,
    pub size: usize,
    pub started_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BrowseStart {
    Ready(ShortlistHandle),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "candidate", rename_all = "snake_case")]
pub enum NextCandidate {
    Candidate(CandidateSummary),
    Exhausted,
}

/// A viewer's materialized shortlist and the zero-based position of the next candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseSession {
    pub viewer_id: UserId,
    pub shortlist: Vec<CandidateSummary>,
    pub cursor: usize,
    pub started_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BrowseSession {
    pub fn new(viewer_id: UserId, shortlist: Vec<CandidateSummary>, now: NaiveDateTime) -> Self {
        Self { viewer_id, shortlist, cursor: 0, started_at: now, updated_at: now }
    }

    pub fn from_row(row: BrowseSessionRow) -> serde_json::Result<Self> {
        Ok(Self {
            viewer_id: row.viewer_id,
            shortlist: serde_json::from_str(&row.shortlist)?,
            cursor: usize::try_from(row.cursor).unwrap_or(0),
            started_at: row.started_at,
            updated_at: row.updated_at,
        })
    }

    pub fn to_row(&self) -> serde_json::Result<BrowseSessionRow> {
        Ok(BrowseSessionRow {
            viewer_id: self.viewer_id,
            shortlist: serde_json::to_string(&self.shortlist)?,
            cursor: self.cursor_value(),
            started_at: self.started_at,
            updated_at: self.updated_at,
        })
    }

    pub fn cursor_value(&self) -> i32 {
        i32::try_from(self.cursor).unwrap_or(i32::MAX)
    }

    pub fn handle(&self) -> ShortlistHandle {
        ShortlistHandle {
            viewer_id: self.viewer_id,
            size: self.shortlist.len(),
            started_at: self.started_at,
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: NaiveDateTime) -> bool {
        is_stale(self.updated_at, ttl, now)
    }

    /// Emits the candidate at the cursor and moves past it; `None` once the list is walked.
    pub fn advance(&mut self, now: NaiveDateTime) -> Option<CandidateSummary> {
        let candidate = self.shortlist.get(self.cursor)?.clone();
        self.cursor += 1;
        self.updated_at = now;
        Some(candidate)
    }

    /// The candidate most recently emitted by `advance`.
    pub fn last_served(&self) -> Option<&CandidateSummary> {
        self.cursor.checked_sub(1).and_then(|index| self.shortlist.get(index))
    }
}

/// A TTL too large to add to `updated_at` never expires.
pub fn is_stale(updated_at: NaiveDateTime, ttl: Duration, now: NaiveDateTime) -> bool {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| updated_at.checked_add_signed(ttl))
        .is_some_and(|deadline| deadline < now)
}
