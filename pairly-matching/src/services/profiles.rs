use validator::Validate;

use pairly_shared::errors::{AppError, AppResult, ErrorCode};

use super::{profile_missing, Matchmaker};
use crate::models::{Interest, InterestId, Profile, ProfileCard, ProfileChanges, UserId};
use crate::profile::{self, ProfileSubmission};
use crate::store;

impl Matchmaker {
    /// Creates or fully replaces the user's profile.
    pub async fn submit_profile(&self, user_id: UserId, submission: ProfileSubmission) -> AppResult<Profile> {
        let submission = submission.normalized();
        submission.validate()?;

        let mut conn = self.conn()?;
        let now = store::now();
        let profile = store::profiles::upsert(&mut conn, &submission.into_record(user_id, now), now)?;

        tracing::info!(user_id, gender = %profile.gender, seeking = %profile.seeking, "profile submitted");
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: UserId) -> AppResult<ProfileCard> {
        let mut conn = self.conn()?;
        let profile = store::profiles::find(&mut conn, user_id)?.ok_or_else(|| profile_missing(user_id))?;
        let interests = store::interests::for_user(&mut conn, user_id)?
            .into_iter()
            .map(|interest| interest.name)
            .collect();

        Ok(ProfileCard { profile, interests })
    }

    /// Applies a sparse edit. An edit naming no field is rejected, not ignored.
    pub async fn update_profile(&self, user_id: UserId, changes: ProfileChanges) -> AppResult<Profile> {
        if changes.is_empty() {
            return Err(AppError::new(ErrorCode::NothingToUpdate, "no profile fields supplied"));
        }
        let changes = profile::prepare_changes(changes).map_err(AppError::validation)?;

        let mut conn = self.conn()?;
        let profile = store::profiles::update(&mut conn, user_id, &changes, store::now())?
            .ok_or_else(|| profile_missing(user_id))?;

        tracing::info!(user_id, "profile updated");
        Ok(profile)
    }

    /// Marks the user active and, when given, records their current public alias.
    pub async fn touch(&self, user_id: UserId, alias: Option<String>) -> AppResult<Profile> {
        let alias = alias.as_deref().and_then(profile::normalize_alias);

        let mut conn = self.conn()?;
        let profile = store::profiles::touch(&mut conn, user_id, alias.as_deref(), store::now())?
            .ok_or_else(|| profile_missing(user_id))?;

        tracing::debug!(user_id, "profile touched");
        Ok(profile)
    }

    pub async fn list_interests(&self) -> AppResult<Vec<Interest>> {
        let mut conn = self.conn()?;
        Ok(store::interests::list(&mut conn)?)
    }

    /// Replaces the user's interest set. Never merges with the previous set.
    pub async fn set_interests(&self, user_id: UserId, ids: Vec<InterestId>) -> AppResult<Vec<Interest>> {
        let mut unique: Vec<InterestId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.len() > self.config.max_interests {
            return Err(AppError::new(
                ErrorCode::TooManyInterests,
                format!("at most {} interests can be selected", self.config.max_interests),
            ));
        }

        let mut conn = self.conn()?;
        if !store::profiles::exists(&mut conn, user_id)? {
            return Err(profile_missing(user_id));
        }

        let known = store::interests::existing_ids(&mut conn, &unique)?;
        let unknown: Vec<InterestId> = unique.iter().copied().filter(|id| !known.contains(id)).collect();
        if !unknown.is_empty() {
            return Err(AppError::with_details(
                ErrorCode::UnknownInterest,
                "unknown interest ids",
                serde_json::json!({ "unknown": unknown }),
            ));
        }

        store::interests::replace_for_user(&mut conn, user_id, &unique)?;
        let interests = store::interests::for_user(&mut conn, user_id)?;

        tracing::info!(user_id, count = interests.len(), "interests replaced");
        Ok(interests)
    }
}
