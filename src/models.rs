use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// The closed set of labels the reports count. Stored rows may carry any
/// string; only these three are ever tallied per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackType {
    Complaint,
    Suggestion,
    Compliment,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 3] = [
        FeedbackType::Complaint,
        FeedbackType::Suggestion,
        FeedbackType::Compliment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Complaint => "complaint",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Compliment => "compliment",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = String;

    /// Exact, case-sensitive match.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FeedbackType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown feedback type `{value}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub feedback_type: String,
    pub created_at: NaiveDateTime,
}

impl FeedbackRecord {
    pub fn new(feedback_type: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            feedback_type: feedback_type.into(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub complaints: i64,
    pub suggestions: i64,
    pub compliments: i64,
}

impl TypeCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a FeedbackRecord>) -> Self {
        let mut counts = TypeCounts::default();
        for record in records {
            match record.feedback_type.parse::<FeedbackType>() {
                Ok(FeedbackType::Complaint) => counts.complaints += 1,
                Ok(FeedbackType::Suggestion) => counts.suggestions += 1,
                Ok(FeedbackType::Compliment) => counts.compliments += 1,
                Err(_) => {}
            }
        }
        counts
    }

    pub fn sum(&self) -> i64 {
        self.complaints + self.suggestions + self.compliments
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total: i64,
    pub by_type: TypeCounts,
}

/// One ISO-8601 week of per-type counts. `year` is the ISO week-based year
/// and only orders buckets internally; the wire shape carries `week` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    #[serde(skip)]
    pub year: i32,
    pub week: u32,
    pub complaints: i64,
    pub suggestions: i64,
    pub compliments: i64,
}

impl WeekBucket {
    pub fn new(year: i32, week: u32, counts: TypeCounts) -> Self {
        Self {
            year,
            week,
            complaints: counts.complaints,
            suggestions: counts.suggestions,
            compliments: counts.compliments,
        }
    }

    pub fn counts(&self) -> TypeCounts {
        TypeCounts {
            complaints: self.complaints,
            suggestions: self.suggestions,
            compliments: self.compliments,
        }
    }
}
