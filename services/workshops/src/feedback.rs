use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::WorkshopError;
use crate::models::{Achievement, BookingStatus, Feedback, SubmitFeedbackRequest};
use crate::reputation::ReputationService;
use crate::store::WorkshopStore;

/// Validates feedback eligibility and hands the rating to the reputation
/// engine. One feedback per booking, enforced by an atomic claim on the
/// booking row, so a rating can never be counted twice.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn WorkshopStore>,
    reputation: ReputationService,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn WorkshopStore>, reputation: ReputationService) -> Self {
        Self { store, reputation }
    }

    pub async fn submit(
        &self,
        student_id: Uuid,
        booking_id: Uuid,
        request: SubmitFeedbackRequest,
    ) -> Result<Feedback, WorkshopError> {
        if !(1..=5).contains(&request.rating) {
            return Err(WorkshopError::InvalidRating(request.rating));
        }
        request.validate()?;

        let booking = self
            .store
            .booking(booking_id)
            .await?
            .ok_or_else(|| WorkshopError::NotFound(format!("booking {}", booking_id)))?;
        if booking.student_id != student_id {
            return Err(WorkshopError::Forbidden(
                "only the booking's student can leave feedback".to_string(),
            ));
        }

        let workshop = self
            .store
            .workshop(booking.workshop_id)
            .await?
            .ok_or_else(|| WorkshopError::NotFound(format!("workshop {}", booking.workshop_id)))?;

        match booking.status {
            BookingStatus::Completed => {}
            // A confirmed booking whose workshop has already ended is treated
            // as attended: feedback completes it on the student's behalf.
            BookingStatus::Confirmed if workshop.is_past_due(Utc::now()) => {
                if self
                    .store
                    .transition_booking(
                        booking_id,
                        BookingStatus::Confirmed,
                        BookingStatus::Completed,
                    )
                    .await?
                {
                    self.reputation.record_session(workshop.mentor_id).await?;
                } else {
                    let current = self
                        .store
                        .booking(booking_id)
                        .await?
                        .ok_or_else(|| WorkshopError::NotFound(format!("booking {}", booking_id)))?;
                    if current.status != BookingStatus::Completed {
                        return Err(WorkshopError::NotEligible(
                            "booking is not completed".to_string(),
                        ));
                    }
                }
            }
            _ => {
                return Err(WorkshopError::NotEligible(
                    "booking is not completed".to_string(),
                ))
            }
        }

        if !self.store.claim_feedback_slot(booking_id).await? {
            return Err(WorkshopError::NotEligible(
                "feedback was already submitted for this booking".to_string(),
            ));
        }

        let feedback = Feedback {
            feedback_id: Uuid::new_v4(),
            booking_id,
            workshop_id: booking.workshop_id,
            mentor_id: workshop.mentor_id,
            student_id,
            rating: request.rating,
            comment: request.comment,
            submitted_at: Utc::now(),
        };
        if let Err(err) = self.persist(&feedback, workshop.mentor_id).await {
            // Give the claim back so the submission can be retried; otherwise
            // a transient store failure burns the student's one feedback.
            if let Err(release_err) = self.store.release_feedback_slot(booking_id).await {
                tracing::error!(
                    booking_id = %booking_id,
                    "failed to release feedback slot after write error: {}",
                    release_err
                );
            }
            return Err(err);
        }

        tracing::info!(
            booking_id = %booking_id,
            mentor_id = %workshop.mentor_id,
            rating = feedback.rating,
            "feedback recorded"
        );
        Ok(feedback)
    }

    async fn persist(&self, feedback: &Feedback, mentor_id: Uuid) -> Result<(), WorkshopError> {
        self.store.insert_feedback(feedback).await?;
        self.reputation
            .record_rating(mentor_id, feedback.rating)
            .await?;
        Ok(())
    }

    pub async fn mark_helpful(&self, mentor_id: Uuid) -> Result<Achievement, WorkshopError> {
        self.reputation.record_helpful_vote(mentor_id).await
    }
}
