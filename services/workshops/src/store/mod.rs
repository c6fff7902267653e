mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use alumnet_common::AppError;

use crate::models::{Achievement, Booking, BookingStatus, Feedback, LeaderboardEntry, Workshop};

/// Result of an atomic confirm attempt.
#[derive(Debug)]
pub enum ConfirmOutcome {
    Confirmed(Booking),
    CapacityExceeded,
    InvalidState(BookingStatus),
    NotFound,
}

/// Persistence seam for the workshops service.
///
/// The workshop's booking set is the unit of mutual exclusion: `confirm_booking`
/// re-checks capacity at the moment of transition rather than trusting a
/// cached read, and the leaderboard is replaced under a single transaction so
/// readers never observe a half-applied recompute.
#[async_trait]
pub trait WorkshopStore: Send + Sync {
    async fn insert_workshop(&self, workshop: &Workshop) -> Result<(), AppError>;
    async fn workshop(&self, workshop_id: Uuid) -> Result<Option<Workshop>, AppError>;
    async fn list_active_workshops(&self) -> Result<Vec<Workshop>, AppError>;
    async fn set_workshop_active(&self, workshop_id: Uuid, is_active: bool)
        -> Result<(), AppError>;
    async fn set_meeting_link(&self, workshop_id: Uuid, link: &str) -> Result<(), AppError>;
    /// Whether the mentor has published at least one workshop.
    async fn mentor_has_workshops(&self, mentor_id: Uuid) -> Result<bool, AppError>;

    async fn insert_booking(&self, booking: &Booking) -> Result<(), AppError>;
    async fn booking(&self, booking_id: Uuid) -> Result<Option<Booking>, AppError>;
    /// All bookings of a workshop in arrival order.
    async fn bookings_for_workshop(&self, workshop_id: Uuid) -> Result<Vec<Booking>, AppError>;
    async fn bookings_for_student(&self, student_id: Uuid) -> Result<Vec<Booking>, AppError>;
    /// Whether the student holds any non-cancelled booking on the workshop.
    async fn has_active_booking(
        &self,
        workshop_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Pending -> Confirmed, permitted only while the number of bookings in a
    /// slot-occupying state is below `max_participants`. The check and the
    /// transition happen atomically.
    async fn confirm_booking(&self, booking_id: Uuid) -> Result<ConfirmOutcome, AppError>;

    /// Compare-and-set transition; returns true iff the booking was in `from`
    /// and is now in `to`.
    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, AppError>;

    /// Flip `feedback_submitted` from false to true; returns false when the
    /// slot was already claimed, which makes duplicate submissions lose the
    /// race instead of double-counting.
    async fn claim_feedback_slot(&self, booking_id: Uuid) -> Result<bool, AppError>;
    /// Undo a claim whose follow-up writes failed, so the submission can be
    /// retried instead of being burned.
    async fn release_feedback_slot(&self, booking_id: Uuid) -> Result<(), AppError>;
    /// Idempotent on the booking: re-inserting after a partial failure must
    /// not produce a second row.
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError>;

    async fn achievement(&self, mentor_id: Uuid) -> Result<Option<Achievement>, AppError>;
    async fn save_achievement(
        &self,
        mentor_id: Uuid,
        achievement: &Achievement,
    ) -> Result<(), AppError>;
    /// Snapshot of every mentor's aggregate record for the batch recompute.
    async fn all_achievements(&self) -> Result<Vec<(Uuid, Achievement)>, AppError>;

    async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, AppError>;
    /// Replace the published ranking in one shot.
    async fn replace_leaderboard(&self, entries: &[LeaderboardEntry]) -> Result<(), AppError>;
}
