use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use alumnet_common::AppError;

use crate::models::{Achievement, Booking, BookingStatus, Feedback, LeaderboardEntry, Workshop};
use crate::store::{ConfirmOutcome, WorkshopStore};

/// In-memory store used by the test suite. Implements the same atomicity
/// contract as the Postgres store: capacity is re-checked under a
/// per-workshop lock at the moment of transition.
#[derive(Default)]
pub struct MemoryStore {
    workshops: DashMap<Uuid, Workshop>,
    bookings: DashMap<Uuid, Booking>,
    feedback: DashMap<Uuid, Feedback>,
    achievements: DashMap<Uuid, Achievement>,
    workshop_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    leaderboard: RwLock<Vec<LeaderboardEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn workshop_lock(&self, workshop_id: Uuid) -> Arc<Mutex<()>> {
        self.workshop_locks
            .entry(workshop_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn occupied_slots(&self, workshop_id: Uuid) -> usize {
        self.bookings
            .iter()
            .filter(|b| b.workshop_id == workshop_id && b.status.occupies_slot())
            .count()
    }
}

#[async_trait]
impl WorkshopStore for MemoryStore {
    async fn insert_workshop(&self, workshop: &Workshop) -> Result<(), AppError> {
        self.workshops
            .insert(workshop.workshop_id, workshop.clone());
        Ok(())
    }

    async fn workshop(&self, workshop_id: Uuid) -> Result<Option<Workshop>, AppError> {
        Ok(self.workshops.get(&workshop_id).map(|w| w.clone()))
    }

    async fn list_active_workshops(&self) -> Result<Vec<Workshop>, AppError> {
        let mut active: Vec<Workshop> = self
            .workshops
            .iter()
            .filter(|w| w.is_active)
            .map(|w| w.clone())
            .collect();
        active.sort_by_key(|w| w.scheduled_date);
        Ok(active)
    }

    async fn set_workshop_active(
        &self,
        workshop_id: Uuid,
        is_active: bool,
    ) -> Result<(), AppError> {
        if let Some(mut workshop) = self.workshops.get_mut(&workshop_id) {
            workshop.is_active = is_active;
            workshop.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_meeting_link(&self, workshop_id: Uuid, link: &str) -> Result<(), AppError> {
        if let Some(mut workshop) = self.workshops.get_mut(&workshop_id) {
            workshop.meeting_link = Some(link.to_string());
            workshop.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mentor_has_workshops(&self, mentor_id: Uuid) -> Result<bool, AppError> {
        Ok(self.workshops.iter().any(|w| w.mentor_id == mentor_id))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), AppError> {
        self.bookings.insert(booking.booking_id, booking.clone());
        Ok(())
    }

    async fn booking(&self, booking_id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.bookings.get(&booking_id).map(|b| b.clone()))
    }

    async fn bookings_for_workshop(&self, workshop_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.workshop_id == workshop_id)
            .map(|b| b.clone())
            .collect();
        bookings.sort_by_key(|b| (b.booked_at, b.booking_id));
        Ok(bookings)
    }

    async fn bookings_for_student(&self, student_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.student_id == student_id)
            .map(|b| b.clone())
            .collect();
        bookings.sort_by_key(|b| (b.booked_at, b.booking_id));
        Ok(bookings)
    }

    async fn has_active_booking(
        &self,
        workshop_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self.bookings.iter().any(|b| {
            b.workshop_id == workshop_id
                && b.student_id == student_id
                && b.status != BookingStatus::Cancelled
        }))
    }

    async fn confirm_booking(&self, booking_id: Uuid) -> Result<ConfirmOutcome, AppError> {
        let workshop_id = match self.bookings.get(&booking_id) {
            Some(booking) => booking.workshop_id,
            None => return Ok(ConfirmOutcome::NotFound),
        };

        let lock = self.workshop_lock(workshop_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; the status may have moved since the caller
        // looked at it.
        let status = match self.bookings.get(&booking_id) {
            Some(booking) => booking.status,
            None => return Ok(ConfirmOutcome::NotFound),
        };
        if status != BookingStatus::Pending {
            return Ok(ConfirmOutcome::InvalidState(status));
        }

        let max_participants = match self.workshops.get(&workshop_id) {
            Some(workshop) => workshop.max_participants as usize,
            None => return Ok(ConfirmOutcome::NotFound),
        };
        if self.occupied_slots(workshop_id) >= max_participants {
            return Ok(ConfirmOutcome::CapacityExceeded);
        }

        let mut booking = self
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| AppError::Internal("booking vanished during confirm".to_string()))?;
        booking.status = BookingStatus::Confirmed;
        booking.updated_at = Utc::now();
        Ok(ConfirmOutcome::Confirmed(booking.clone()))
    }

    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, AppError> {
        let workshop_id = match self.bookings.get(&booking_id) {
            Some(booking) => booking.workshop_id,
            None => return Ok(false),
        };
        let lock = self.workshop_lock(workshop_id);
        let _guard = lock.lock().await;

        match self.bookings.get_mut(&booking_id) {
            Some(mut booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn claim_feedback_slot(&self, booking_id: Uuid) -> Result<bool, AppError> {
        match self.bookings.get_mut(&booking_id) {
            Some(mut booking) if !booking.feedback_submitted => {
                booking.feedback_submitted = true;
                booking.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_feedback_slot(&self, booking_id: Uuid) -> Result<(), AppError> {
        if let Some(mut booking) = self.bookings.get_mut(&booking_id) {
            booking.feedback_submitted = false;
            booking.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        // Keyed by booking so a retried submission lands on the same row.
        self.feedback.insert(feedback.booking_id, feedback.clone());
        Ok(())
    }

    async fn achievement(&self, mentor_id: Uuid) -> Result<Option<Achievement>, AppError> {
        Ok(self.achievements.get(&mentor_id).map(|a| a.clone()))
    }

    async fn save_achievement(
        &self,
        mentor_id: Uuid,
        achievement: &Achievement,
    ) -> Result<(), AppError> {
        self.achievements.insert(mentor_id, achievement.clone());
        Ok(())
    }

    async fn all_achievements(&self) -> Result<Vec<(Uuid, Achievement)>, AppError> {
        Ok(self
            .achievements
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }

    async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, AppError> {
        let board = self.leaderboard.read().await;
        let take = limit.map(|l| l.max(0) as usize).unwrap_or(board.len());
        Ok(board.iter().take(take).cloned().collect())
    }

    async fn replace_leaderboard(&self, entries: &[LeaderboardEntry]) -> Result<(), AppError> {
        let mut board = self.leaderboard.write().await;
        *board = entries.to_vec();
        Ok(())
    }
}
