#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use pairly_matching::config::MatchingConfig;
use pairly_matching::models::{Gender, InterestId, Seeking, UserId};
use pairly_matching::notify::MemoryTransport;
use pairly_matching::profile::ProfileSubmission;
use pairly_matching::services::Matchmaker;
use pairly_matching::store;
use pairly_shared::clients::db::{create_pool, DbPool};

pub struct Harness {
    pub matchmaker: Arc<Matchmaker>,
    pub transport: Arc<MemoryTransport>,
    pub pool: DbPool,
    _dir: TempDir,
}

pub fn harness() -> Harness {
    harness_with(MatchingConfig::default())
}

pub fn harness_with(config: MatchingConfig) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pairly.db");
    let pool = create_pool(path.to_str().expect("utf-8 path"), 4).expect("pool");
    store::migrate(&pool).expect("schema");

    let transport = Arc::new(MemoryTransport::new());
    let matchmaker = Arc::new(Matchmaker::new(pool.clone(), transport.clone(), config));

    Harness { matchmaker, transport, pool, _dir: dir }
}

pub fn submission(name: &str, age: i32, gender: Gender, seeking: Seeking) -> ProfileSubmission {
    ProfileSubmission {
        name: name.to_string(),
        age,
        description: format!("{name} enjoys weekend hikes"),
        photo: format!("photo-{}", name.to_lowercase()),
        gender,
        seeking,
        city: None,
        alias: None,
    }
}

pub async fn add_user(
    harness: &Harness,
    user_id: UserId,
    name: &str,
    age: i32,
    gender: Gender,
    seeking: Seeking,
    interests: &[InterestId],
) {
    harness
        .matchmaker
        .submit_profile(user_id, submission(name, age, gender, seeking))
        .await
        .expect("profile submitted");
    harness
        .matchmaker
        .set_interests(user_id, interests.to_vec())
        .await
        .expect("interests set");
}
