use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::models::{Gender, ProfileChanges, ProfileRecord, Seeking, UserId};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 64;
pub const AGE_MIN: i32 = 18;
pub const AGE_MAX: i32 = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const CITY_MAX_CHARS: usize = 64;
pub const MAX_INTERESTS: usize = 5;

/// A completed profile as collected by the front end.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ProfileSubmission {
    #[validate(length(min = 2, max = 64, message = "name must be 2 to 64 characters"))]
    pub name: String,
    #[validate(range(min = 18, max = 100, message = "age must be between 18 and 100"))]
    pub age: i32,
    #[validate(length(min = 10, max = 1000, message = "description must be 10 to 1000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "a photo is required"))]
    pub photo: String,
    pub gender: Gender,
    pub seeking: Seeking,
    #[validate(length(max = 64, message = "city must be at most 64 characters"))]
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ProfileSubmission {
    /// Trims text fields and folds blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.photo = self.photo.trim().to_string();
        self.city = self.city.as_deref().and_then(normalize_city);
        self.alias = self.alias.as_deref().and_then(normalize_alias);
        self
    }

    pub fn into_record(self, user_id: UserId, now: NaiveDateTime) -> ProfileRecord {
        ProfileRecord {
            user_id,
            name: self.name,
            age: self.age,
            description: self.description,
            photo_id: self.photo,
            gender: self.gender,
            seeking: self.seeking,
            city: self.city,
            alias: self.alias,
            last_active: now,
        }
    }
}

pub fn normalize_city(raw: &str) -> Option<String> {
    let city = raw.trim();
    (!city.is_empty()).then(|| city.to_string())
}

/// Aliases are stored without the leading `@`.
pub fn normalize_alias(raw: &str) -> Option<String> {
    let alias = raw.trim().trim_start_matches('@');
    (!alias.is_empty()).then(|| alias.to_string())
}

// --- Field checks shared by edits and the dialogue ---

pub fn check_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(format!("name must be {NAME_MIN_CHARS} to {NAME_MAX_CHARS} characters"))
    }
}

pub fn check_age(age: i32) -> Result<(), String> {
    if (AGE_MIN..=AGE_MAX).contains(&age) {
        Ok(())
    } else {
        Err(format!("age must be between {AGE_MIN} and {AGE_MAX}"))
    }
}

pub fn check_description(description: &str) -> Result<(), String> {
    let len = description.trim().chars().count();
    if (DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "description must be {DESCRIPTION_MIN_CHARS} to {DESCRIPTION_MAX_CHARS} characters"
        ))
    }
}

pub fn check_photo(photo: &str) -> Result<(), String> {
    if photo.trim().is_empty() {
        Err("a photo is required".to_string())
    } else {
        Ok(())
    }
}

pub fn check_city(city: &str) -> Result<(), String> {
    if city.trim().chars().count() <= CITY_MAX_CHARS {
        Ok(())
    } else {
        Err(format!("city must be at most {CITY_MAX_CHARS} characters"))
    }
}

/// Validates and normalizes a sparse edit in place.
pub fn prepare_changes(mut changes: ProfileChanges) -> Result<ProfileChanges, String> {
    if let Some(name) = &changes.name {
        check_name(name)?;
        changes.name = Some(name.trim().to_string());
    }
    if let Some(age) = changes.age {
        check_age(age)?;
    }
    if let Some(description) = &changes.description {
        check_description(description)?;
        changes.description = Some(description.trim().to_string());
    }
    if let Some(photo) = &changes.photo_id {
        check_photo(photo)?;
        changes.photo_id = Some(photo.trim().to_string());
    }
    if let Some(Some(city)) = &changes.city {
        check_city(city)?;
        changes.city = Some(normalize_city(city));
    }
    if let Some(Some(alias)) = &changes.alias {
        changes.alias = Some(normalize_alias(alias));
    }
    Ok(changes)
}
