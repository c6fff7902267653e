use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum length of a feedback comment, mirrored by the database check.
pub const MAX_FEEDBACK_COMMENT_CHARS: usize = 500;

/// Booking lifecycle. `Cancelled` and `Completed` are terminal; a booking
/// never leaves either state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// A booking in this state occupies one of the workshop's slots.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    // Exact match only. Stored values outside the closed set are rejected at
    // the read boundary instead of being case-normalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other:?}")),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold-derived mentor badges. The set is recomputed from the aggregate
/// on every change and a badge is dropped when its metric regresses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Badge {
    #[serde(rename = "Star Mentor")]
    StarMentor,
    #[serde(rename = "Top Rated")]
    TopRated,
    #[serde(rename = "50 Sessions")]
    FiftySessions,
    #[serde(rename = "100 Sessions")]
    HundredSessions,
    #[serde(rename = "Community Hero")]
    CommunityHero,
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Badge::StarMentor => "Star Mentor",
            Badge::TopRated => "Top Rated",
            Badge::FiftySessions => "50 Sessions",
            Badge::HundredSessions => "100 Sessions",
            Badge::CommunityHero => "Community Hero",
        };
        f.write_str(name)
    }
}

/// A mentor's running reputation aggregate. Mutated only through the
/// reputation service, never directly by a client request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Achievement {
    pub total_sessions_conducted: i64,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub total_helpful_votes: i64,
    pub leaderboard_points: f64,
    pub badges: BTreeSet<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workshop {
    pub workshop_id: Uuid,
    pub mentor_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub max_participants: i32,
    pub is_paid: bool,
    pub price: Option<Decimal>,
    pub meeting_link: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workshop {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_date + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.ends_at() <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: Uuid,
    pub workshop_id: Uuid,
    pub student_id: Uuid,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub feedback_submitted: bool,
    pub booked_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback_id: Uuid,
    pub booking_id: Uuid,
    pub workshop_id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// One row of the global ranking, derived from the achievement set and
/// replaced wholesale on every recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub mentor_id: Uuid,
    pub points: f64,
    pub average_rating: f64,
    pub total_sessions_conducted: i64,
    pub badges: BTreeSet<Badge>,
}

// Request/response shapes

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkshopRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(range(min = 1))]
    pub max_participants: i32,
    #[serde(default)]
    pub is_paid: bool,
    pub price: Option<Decimal>,
    #[validate(url, length(max = 500))]
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateBookingStatusRequest {
    pub target: BookingStatus,
    #[validate(url, length(max = 500))]
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitFeedbackRequest {
    pub rating: i32,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// Read-only projection of how far a mentor is from an unearned badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeProgress {
    pub badge: Badge,
    pub current: f64,
    pub required: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementResponse {
    pub mentor_id: Uuid,
    #[serde(flatten)]
    pub achievement: Achievement,
    pub badge_progress: Vec<BadgeProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopCompletionResponse {
    pub workshop_id: Uuid,
    pub completed_bookings: usize,
}
