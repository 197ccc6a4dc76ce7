use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::{
    blocks, broadcasts, browse_sessions, interests, likes, matches, pending_replies, profiles,
    reports, user_interests, viewed_profiles,
};

/// Externally assigned numeric identity (the messenger's user id).
pub type UserId = i64;
pub type InterestId = i32;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Text-backed enums share one SQLite mapping: `as_str` out, `FromStr` in.
macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql<Text, Sqlite> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                let value: &'b str = self.as_str();
                out.set_value(value);
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Sqlite> for $ty {
            fn from_sql(bytes: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
                Ok(raw.parse::<$ty>()?)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// --- Gender / Seeking ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" | "M" => Ok(Self::Male),
            "FEMALE" | "F" => Ok(Self::Female),
            _ => Err(UnknownVariant { kind: "gender", value: s.to_string() }),
        }
    }
}

text_enum_sql!(Gender);

/// The gender category a user wants to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum Seeking {
    Male,
    Female,
    Any,
}

impl Seeking {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Any => "ANY",
        }
    }

    /// The single gender this preference restricts to, if any.
    pub fn gender(&self) -> Option<Gender> {
        match self {
            Self::Male => Some(Gender::Male),
            Self::Female => Some(Gender::Female),
            Self::Any => None,
        }
    }
}

impl FromStr for Seeking {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" | "M" => Ok(Self::Male),
            "FEMALE" | "F" => Ok(Self::Female),
            "ANY" | "MF" | "BOTH" => Ok(Self::Any),
            _ => Err(UnknownVariant { kind: "seeking preference", value: s.to_string() }),
        }
    }
}

text_enum_sql!(Seeking);

// --- Profile ---

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = profiles)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(Sqlite))]
pub struct Profile {
    pub user_id: UserId,
    pub name: String,
    pub age: i32,
    pub description: String,
    #[serde(rename = "photo")]
    pub photo_id: String,
    pub gender: Gender,
    pub seeking: Seeking,
    pub city: Option<String>,
    pub alias: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_active: NaiveDateTime,
}

/// Full-row write used by profile submission; `created_at` is supplied only on first insert.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
pub struct ProfileRecord {
    pub user_id: UserId,
    pub name: String,
    pub age: i32,
    pub description: String,
    pub photo_id: String,
    pub gender: Gender,
    pub seeking: Seeking,
    pub city: Option<String>,
    pub alias: Option<String>,
    pub last_active: NaiveDateTime,
}

/// Sparse profile edit. Absent fields are left untouched; `city`/`alias` may be cleared
/// by sending an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "photo")]
    pub photo_id: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub seeking: Option<Seeking>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub alias: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.description.is_none()
            && self.photo_id.is_none()
            && self.gender.is_none()
            && self.seeking.is_none()
            && self.city.is_none()
            && self.alias.is_none()
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Profile plus interest names, the "my profile" view.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCard {
    #[serde(flatten)]
    pub profile: Profile,
    pub interests: Vec<String>,
}

// --- Interests ---

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = interests)]
#[diesel(check_for_backend(Sqlite))]
pub struct Interest {
    pub id: InterestId,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_interests)]
pub struct NewUserInterest {
    pub user_id: UserId,
    pub interest_id: InterestId,
}

// --- Ledger records ---

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub liker_id: UserId,
    pub liked_id: UserId,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = viewed_profiles)]
pub struct NewView {
    pub viewer_id: UserId,
    pub viewed_id: UserId,
    pub viewed_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: UserId,
    pub blocked_id: UserId,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: UserId,
    pub reported_id: UserId,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_low: UserId,
    pub user_high: UserId,
    pub matched_at: NaiveDateTime,
}

impl NewMatch {
    /// Unordered pair, stored low id first.
    pub fn for_pair(a: UserId, b: UserId, matched_at: NaiveDateTime) -> Self {
        let (user_low, user_high) = if a < b { (a, b) } else { (b, a) };
        Self { user_low, user_high, matched_at }
    }
}

// --- Ranking output ---

/// One entry of a shortlist, as shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub user_id: UserId,
    pub name: String,
    pub age: i32,
    pub description: String,
    pub photo: String,
    pub shared_interests: u32,
    pub age_difference: u32,
}

/// A user who liked the viewer and has not been liked back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikerSummary {
    pub user_id: UserId,
    pub name: String,
    pub age: i32,
    pub description: String,
    pub photo: String,
    pub liked_at: NaiveDateTime,
}

// --- Sessions ---

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = browse_sessions)]
#[diesel(check_for_backend(Sqlite))]
pub struct BrowseSessionRow {
    pub viewer_id: UserId,
    /// JSON-encoded `Vec<CandidateSummary>`.
    pub shortlist: String,
    pub cursor: i32,
    pub started_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pending_replies)]
#[diesel(check_for_backend(Sqlite))]
pub struct PendingReply {
    pub viewer_id: UserId,
    pub liker_id: UserId,
    pub updated_at: NaiveDateTime,
}

// --- Broadcasts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Pending,
    Approved,
    Declined,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for BroadcastStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            _ => Err(UnknownVariant { kind: "broadcast status", value: s.to_string() }),
        }
    }
}

text_enum_sql!(BroadcastStatus);

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = broadcasts)]
#[diesel(check_for_backend(Sqlite))]
pub struct Broadcast {
    pub id: i32,
    pub sender_id: UserId,
    pub body: String,
    /// JSON-encoded `Vec<InterestId>`.
    #[serde(skip)]
    pub interest_ids: String,
    pub status: BroadcastStatus,
    pub created_at: NaiveDateTime,
    pub decided_at: Option<NaiveDateTime>,
}

impl Broadcast {
    pub fn interests(&self) -> serde_json::Result<Vec<InterestId>> {
        serde_json::from_str(&self.interest_ids)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = broadcasts)]
pub struct NewBroadcast {
    pub sender_id: UserId,
    pub body: String,
    pub interest_ids: String,
    pub status: BroadcastStatus,
    pub created_at: NaiveDateTime,
}
