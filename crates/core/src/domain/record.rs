use std::{fmt::Formatter, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use uuid::Uuid;

/// Format of `created_at`, local time with microseconds.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(CREATED_AT_FORMAT).to_string()
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Rating {0} is outside of 0..=10")]
    RatingOutOfRange(f64),
    #[error("Rating {0} is not a multiple of 0.5")]
    RatingOffStep(f64),
    #[error("Rating '{0}' is not a number")]
    RatingNotANumber(String),
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Invalid record id '{0}'")]
    InvalidRecordId(String),
    #[error("Invalid file link '{0}'")]
    InvalidLink(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Novel,
    Asmr,
    Av,
    Doujin,
    Anime,
    Manga,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Novel => "Novel",
            Category::Asmr => "ASMR",
            Category::Av => "AV",
            Category::Doujin => "Doujin",
            Category::Anime => "Anime",
            Category::Manga => "Manga",
        }
    }

    /// Labels written by the first revisions of the catalogue sheet.
    fn legacy_label(&self) -> &'static str {
        match self {
            Category::Novel => "小说",
            Category::Asmr => "ASMR",
            Category::Av => "AV",
            Category::Doujin => "同人本",
            Category::Anime => "动画",
            Category::Manga => "漫画",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = RecordValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::iter()
            .find(|c| c.label().eq_ignore_ascii_case(s) || c.legacy_label() == s)
            .ok_or_else(|| RecordValidationError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = RecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

/// A score between 0 and 10 in half-point steps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;
    pub const STEP: f64 = 0.5;
    pub const DEFAULT: Rating = Rating(7.5);

    pub fn new(value: f64) -> Result<Self, RecordValidationError> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RecordValidationError::RatingOutOfRange(value));
        }
        let steps = value / Self::STEP;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(RecordValidationError::RatingOffStep(value));
        }
        Ok(Rating(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::DEFAULT
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl FromStr for Rating {
    type Err = RecordValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let value = normalized
            .parse::<f64>()
            .map_err(|_| RecordValidationError::RatingNotANumber(s.to_string()))?;
        Rating::new(value)
    }
}

impl TryFrom<f64> for Rating {
    type Error = RecordValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = RecordValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(RecordId)
            .map_err(|_| RecordValidationError::InvalidRecordId(s.to_string()))
    }
}

/// Checks that `link` is an absolute http(s) URL.
pub fn validate_link(link: &str) -> Result<(), RecordValidationError> {
    match reqwest::Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(RecordValidationError::InvalidLink(link.to_string())),
    }
}

/// One catalogued item, stored as a single worksheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Absent on rows written before identifiers were introduced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub tags: String,
    pub rating: Rating,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_link: Option<String>,
}

impl Record {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::EmptyTitle);
        }
        if let Some(link) = &self.file_link {
            validate_link(link)?;
        }
        Ok(())
    }
}

/// User input for a new record, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub title: String,
    pub category: Category,
    pub tags: String,
    pub rating: Rating,
    pub review: String,
}

impl RecordDraft {
    pub fn new(title: impl Into<String>, category: Category, rating: Rating) -> Self {
        RecordDraft {
            title: title.into(),
            category,
            tags: String::new(),
            rating,
            review: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = review.into();
        self
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn into_record(self, created_at: String, file_link: Option<String>) -> Record {
        Record {
            id: Some(RecordId::generate()),
            title: self.title.trim().to_string(),
            category: self.category,
            tags: self.tags.trim().to_string(),
            rating: self.rating,
            review: self.review,
            created_at,
            file_link,
        }
    }
}

/// Partial change to a stored record. `id` and `created_at` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<String>,
    pub rating: Option<Rating>,
    pub review: Option<String>,
    /// `Some(None)` clears the link.
    pub file_link: Option<Option<String>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self == &RecordPatch::default()
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(RecordValidationError::EmptyTitle);
            }
        }
        if let Some(Some(link)) = &self.file_link {
            validate_link(link)?;
        }
        Ok(())
    }

    pub fn apply(&self, record: &Record) -> Result<Record, RecordValidationError> {
        let mut updated = record.clone();
        if let Some(title) = &self.title {
            updated.title = title.trim().to_string();
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(tags) = &self.tags {
            updated.tags = tags.trim().to_string();
        }
        if let Some(rating) = self.rating {
            updated.rating = rating;
        }
        if let Some(review) = &self.review {
            updated.review = review.clone();
        }
        if let Some(file_link) = &self.file_link {
            updated.file_link = file_link.clone();
        }
        updated.validate()?;
        Ok(updated)
    }
}
