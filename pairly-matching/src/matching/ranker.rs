use std::cmp::Ordering;

use diesel::prelude::*;

use crate::models::{CandidateSummary, Profile, Seeking, UserId};
use crate::store::{interests, ledger, profiles};

/// Inputs of one ranking call for a viewer.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub viewer_id: UserId,
    pub viewer_age: i32,
    pub seeking: Seeking,
    pub exclude_previously_viewed: bool,
    pub limit: usize,
}

impl RankRequest {
    pub fn for_viewer(viewer: &Profile, limit: usize) -> Self {
        Self {
            viewer_id: viewer.user_id,
            viewer_age: viewer.age,
            seeking: viewer.seeking,
            exclude_previously_viewed: true,
            limit,
        }
    }
}

/// Builds the ordered shortlist for a viewer. Read-only: views are recorded when a candidate
/// is served, not here.
pub fn rank(conn: &mut SqliteConnection, request: &RankRequest) -> QueryResult<Vec<CandidateSummary>> {
    let excluded = if request.exclude_previously_viewed {
        let mut ids = ledger::viewed_ids(conn, request.viewer_id)?;
        ids.extend(ledger::blocked_either_way(conn, request.viewer_id)?);
        ids
    } else {
        Vec::new()
    };

    let pool = profiles::candidates(conn, request.viewer_id, request.seeking.gender(), &excluded)?;
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let viewer_tags = interests::ids_for_user(conn, request.viewer_id)?;
    let shared = if viewer_tags.is_empty() {
        Default::default()
    } else {
        interests::shared_counts(conn, &viewer_tags)?
    };

    let candidates = pool
        .into_iter()
        .map(|profile| {
            let shared_interests = shared.get(&profile.user_id).copied().unwrap_or(0);
            summarize(profile, request.viewer_age, shared_interests)
        })
        .collect();

    Ok(order(candidates, request.limit))
}

fn summarize(profile: Profile, viewer_age: i32, shared_interests: u32) -> CandidateSummary {
    CandidateSummary {
        age_difference: profile.age.abs_diff(viewer_age),
        user_id: profile.user_id,
        name: profile.name,
        age: profile.age,
        description: profile.description,
        photo: profile.photo_id,
        shared_interests,
    }
}

/// More shared interests first, then smaller age gap, then lower id.
pub fn compare(a: &CandidateSummary, b: &CandidateSummary) -> Ordering {
    b.shared_interests
        .cmp(&a.shared_interests)
        .then(a.age_difference.cmp(&b.age_difference))
        .then(a.user_id.cmp(&b.user_id))
}

pub fn order(mut candidates: Vec<CandidateSummary>, limit: usize) -> Vec<CandidateSummary> {
    candidates.sort_by(compare);
    candidates.truncate(limit);
    candidates
}
