use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::error::WorkshopError;
use crate::models::{
    Booking, BookingStatus, CreateBookingRequest, CreateWorkshopRequest,
    UpdateBookingStatusRequest, Workshop, WorkshopCompletionResponse,
};
use crate::reputation::ReputationService;
use crate::store::{ConfirmOutcome, WorkshopStore};

/// Owns the booking state machine: Pending -> Confirmed/Cancelled ->
/// Completed. Capacity is enforced at the moment of the confirm transition,
/// and completion feeds the mentor's session counter exactly once.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn WorkshopStore>,
    reputation: ReputationService,
}

impl BookingService {
    pub fn new(store: Arc<dyn WorkshopStore>, reputation: ReputationService) -> Self {
        Self { store, reputation }
    }

    pub async fn create_workshop(
        &self,
        mentor_id: Uuid,
        request: CreateWorkshopRequest,
    ) -> Result<Workshop, WorkshopError> {
        request.validate()?;

        match (request.is_paid, request.price) {
            (true, None) => {
                return Err(WorkshopError::Validation(
                    "price is required for a paid workshop".to_string(),
                ))
            }
            (true, Some(price)) if price < Decimal::ZERO => {
                return Err(WorkshopError::Validation(
                    "price must not be negative".to_string(),
                ))
            }
            (false, Some(_)) => {
                return Err(WorkshopError::Validation(
                    "price is only allowed on a paid workshop".to_string(),
                ))
            }
            _ => {}
        }

        let now = Utc::now();
        if request.scheduled_date <= now {
            return Err(WorkshopError::Validation(
                "workshop must be scheduled in the future".to_string(),
            ));
        }

        let workshop = Workshop {
            workshop_id: Uuid::new_v4(),
            mentor_id,
            title: request.title,
            description: request.description,
            scheduled_date: request.scheduled_date,
            duration_minutes: request.duration_minutes,
            max_participants: request.max_participants,
            is_paid: request.is_paid,
            price: request.price,
            meeting_link: request.meeting_link,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_workshop(&workshop).await?;

        tracing::info!(workshop_id = %workshop.workshop_id, mentor_id = %mentor_id, "workshop created");
        Ok(workshop)
    }

    pub async fn get_workshop(&self, workshop_id: Uuid) -> Result<Workshop, WorkshopError> {
        self.store
            .workshop(workshop_id)
            .await?
            .ok_or_else(|| WorkshopError::NotFound(format!("workshop {}", workshop_id)))
    }

    pub async fn list_workshops(&self) -> Result<Vec<Workshop>, WorkshopError> {
        Ok(self.store.list_active_workshops().await?)
    }

    /// A new booking starts Pending and does not consume a slot, so capacity
    /// is not checked here.
    pub async fn create_booking(
        &self,
        student_id: Uuid,
        workshop_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<Booking, WorkshopError> {
        request.validate()?;

        let workshop = self.get_workshop(workshop_id).await?;
        if !workshop.is_active {
            return Err(WorkshopError::WorkshopInactive);
        }
        if workshop.mentor_id == student_id {
            return Err(WorkshopError::Forbidden(
                "mentors cannot book their own workshop".to_string(),
            ));
        }
        if self
            .store
            .has_active_booking(workshop_id, student_id)
            .await?
        {
            return Err(WorkshopError::DuplicateBooking);
        }

        let now = Utc::now();
        let booking = Booking {
            booking_id: Uuid::new_v4(),
            workshop_id,
            student_id,
            status: BookingStatus::Pending,
            notes: request.notes,
            feedback_submitted: false,
            booked_at: now,
            updated_at: now,
        };
        self.store.insert_booking(&booking).await?;

        tracing::info!(booking_id = %booking.booking_id, workshop_id = %workshop_id, "booking created");
        Ok(booking)
    }

    pub async fn set_status(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> Result<Booking, WorkshopError> {
        request.validate()?;

        let booking = self.load_booking(booking_id).await?;
        let workshop = self.get_workshop(booking.workshop_id).await?;

        match request.target {
            BookingStatus::Pending => Err(WorkshopError::Validation(
                "Pending is not a valid transition target".to_string(),
            )),
            BookingStatus::Confirmed => {
                self.confirm(actor_id, &booking, &workshop, request.meeting_link)
                    .await
            }
            BookingStatus::Cancelled => self.cancel(actor_id, &booking, &workshop).await,
            BookingStatus::Completed => self.complete(actor_id, &booking, &workshop).await,
        }
    }

    async fn confirm(
        &self,
        actor_id: Uuid,
        booking: &Booking,
        workshop: &Workshop,
        meeting_link: Option<String>,
    ) -> Result<Booking, WorkshopError> {
        if workshop.mentor_id != actor_id {
            return Err(WorkshopError::Forbidden(
                "only the workshop's mentor can confirm a booking".to_string(),
            ));
        }

        match self.store.confirm_booking(booking.booking_id).await? {
            ConfirmOutcome::Confirmed(confirmed) => {
                // The link is only written once the confirm has gone through;
                // a rejected confirm must leave the workshop untouched.
                if let Some(link) = meeting_link {
                    self.store
                        .set_meeting_link(workshop.workshop_id, &link)
                        .await?;
                }
                tracing::info!(booking_id = %confirmed.booking_id, "booking confirmed");
                Ok(confirmed)
            }
            ConfirmOutcome::CapacityExceeded => Err(WorkshopError::CapacityExceeded),
            ConfirmOutcome::InvalidState(from) => Err(WorkshopError::InvalidTransition {
                from,
                target: BookingStatus::Confirmed,
            }),
            ConfirmOutcome::NotFound => Err(WorkshopError::NotFound(format!(
                "booking {}",
                booking.booking_id
            ))),
        }
    }

    async fn cancel(
        &self,
        actor_id: Uuid,
        booking: &Booking,
        workshop: &Workshop,
    ) -> Result<Booking, WorkshopError> {
        if actor_id != booking.student_id && actor_id != workshop.mentor_id {
            return Err(WorkshopError::Forbidden(
                "only the student or the mentor can cancel a booking".to_string(),
            ));
        }

        match booking.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                if self
                    .store
                    .transition_booking(booking.booking_id, booking.status, BookingStatus::Cancelled)
                    .await?
                {
                    tracing::info!(booking_id = %booking.booking_id, "booking cancelled");
                    self.load_booking(booking.booking_id).await
                } else {
                    // The status moved underneath us; report the conflict.
                    let current = self.load_booking(booking.booking_id).await?;
                    Err(WorkshopError::InvalidTransition {
                        from: current.status,
                        target: BookingStatus::Cancelled,
                    })
                }
            }
            from => Err(WorkshopError::InvalidTransition {
                from,
                target: BookingStatus::Cancelled,
            }),
        }
    }

    async fn complete(
        &self,
        actor_id: Uuid,
        booking: &Booking,
        workshop: &Workshop,
    ) -> Result<Booking, WorkshopError> {
        if workshop.mentor_id != actor_id {
            return Err(WorkshopError::Forbidden(
                "only the workshop's mentor can complete a booking".to_string(),
            ));
        }
        if booking.status != BookingStatus::Confirmed
            || !workshop.is_past_due(Utc::now())
        {
            return Err(WorkshopError::InvalidTransition {
                from: booking.status,
                target: BookingStatus::Completed,
            });
        }

        if self
            .store
            .transition_booking(
                booking.booking_id,
                BookingStatus::Confirmed,
                BookingStatus::Completed,
            )
            .await?
        {
            // The transition guard makes this increment idempotent: a second
            // complete never reaches here.
            self.reputation.record_session(workshop.mentor_id).await?;
            tracing::info!(booking_id = %booking.booking_id, "booking completed");
            self.load_booking(booking.booking_id).await
        } else {
            let current = self.load_booking(booking.booking_id).await?;
            Err(WorkshopError::InvalidTransition {
                from: current.status,
                target: BookingStatus::Completed,
            })
        }
    }

    /// Mentor marks the whole workshop complete: every Confirmed booking is
    /// completed (each one feeding the session counter) and the workshop
    /// stops accepting bookings.
    pub async fn complete_workshop(
        &self,
        actor_id: Uuid,
        workshop_id: Uuid,
    ) -> Result<WorkshopCompletionResponse, WorkshopError> {
        let workshop = self.get_workshop(workshop_id).await?;
        if workshop.mentor_id != actor_id {
            return Err(WorkshopError::Forbidden(
                "only the workshop's mentor can complete the workshop".to_string(),
            ));
        }

        let mut completed = 0;
        for booking in self.store.bookings_for_workshop(workshop_id).await? {
            if booking.status != BookingStatus::Confirmed {
                continue;
            }
            if self
                .store
                .transition_booking(
                    booking.booking_id,
                    BookingStatus::Confirmed,
                    BookingStatus::Completed,
                )
                .await?
            {
                self.reputation.record_session(workshop.mentor_id).await?;
                completed += 1;
            }
        }

        self.store.set_workshop_active(workshop_id, false).await?;
        tracing::info!(workshop_id = %workshop_id, completed, "workshop marked complete");

        Ok(WorkshopCompletionResponse {
            workshop_id,
            completed_bookings: completed,
        })
    }

    pub async fn workshop_roster(
        &self,
        actor_id: Uuid,
        workshop_id: Uuid,
    ) -> Result<Vec<Booking>, WorkshopError> {
        let workshop = self.get_workshop(workshop_id).await?;
        if workshop.mentor_id != actor_id {
            return Err(WorkshopError::Forbidden(
                "only the workshop's mentor can view the roster".to_string(),
            ));
        }
        Ok(self.store.bookings_for_workshop(workshop_id).await?)
    }

    pub async fn student_bookings(&self, student_id: Uuid) -> Result<Vec<Booking>, WorkshopError> {
        Ok(self.store.bookings_for_student(student_id).await?)
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, WorkshopError> {
        self.store
            .booking(booking_id)
            .await?
            .ok_or_else(|| WorkshopError::NotFound(format!("booking {}", booking_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::LeaderboardService;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn service() -> (Arc<MemoryStore>, BookingService) {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn WorkshopStore> = store.clone();
        let leaderboard = LeaderboardService::new(dyn_store.clone());
        let reputation = ReputationService::new(dyn_store.clone(), leaderboard);
        let bookings = BookingService::new(dyn_store, reputation);
        (store, bookings)
    }

    fn workshop_fixture(mentor_id: Uuid, max_participants: i32, past_due: bool) -> Workshop {
        let now = Utc::now();
        let scheduled_date = if past_due {
            now - Duration::hours(3)
        } else {
            now + Duration::days(2)
        };
        Workshop {
            workshop_id: Uuid::new_v4(),
            mentor_id,
            title: "Resume deep-dive".to_string(),
            description: None,
            scheduled_date,
            duration_minutes: 60,
            max_participants,
            is_paid: false,
            price: None,
            meeting_link: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed_workshop(store: &MemoryStore, workshop: &Workshop) {
        store.insert_workshop(workshop).await.unwrap();
    }

    fn confirm_request() -> UpdateBookingStatusRequest {
        UpdateBookingStatusRequest {
            target: BookingStatus::Confirmed,
            meeting_link: None,
        }
    }

    #[tokio::test]
    async fn booking_lifecycle_happy_path() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let student = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, true);
        seed_workshop(&store, &workshop).await;

        let booking = service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);

        let booking = service
            .set_status(mentor, booking.booking_id, confirm_request())
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        let booking = service
            .set_status(
                mentor,
                booking.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Completed,
                    meeting_link: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);

        // Completion feeds the mentor's session counter.
        let achievement = store.achievement(mentor).await.unwrap().unwrap();
        assert_eq!(achievement.total_sessions_conducted, 1);
    }

    #[tokio::test]
    async fn booking_on_inactive_workshop_is_rejected() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let mut workshop = workshop_fixture(mentor, 5, false);
        workshop.is_active = false;
        seed_workshop(&store, &workshop).await;

        let err = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::WorkshopInactive));
    }

    #[tokio::test]
    async fn duplicate_booking_is_rejected_until_cancelled() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let student = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, false);
        seed_workshop(&store, &workshop).await;

        let first = service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();

        let err = service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::DuplicateBooking));

        // After cancelling, the student may book again.
        service
            .set_status(
                student,
                first.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Cancelled,
                    meeting_link: None,
                },
            )
            .await
            .unwrap();
        service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn confirm_respects_capacity() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 1, false);
        seed_workshop(&store, &workshop).await;

        let first = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        let second = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();

        service
            .set_status(mentor, first.booking_id, confirm_request())
            .await
            .unwrap();

        let err = service
            .set_status(mentor, second.booking_id, confirm_request())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::CapacityExceeded));
    }

    #[tokio::test]
    async fn cancelling_a_confirmed_booking_frees_its_slot() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 1, false);
        seed_workshop(&store, &workshop).await;

        let first = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        let second = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();

        service
            .set_status(mentor, first.booking_id, confirm_request())
            .await
            .unwrap();
        service
            .set_status(
                mentor,
                first.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Cancelled,
                    meeting_link: None,
                },
            )
            .await
            .unwrap();

        service
            .set_status(mentor, second.booking_id, confirm_request())
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_confirms_never_exceed_capacity() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 2, false);
        seed_workshop(&store, &workshop).await;

        let mut booking_ids = Vec::new();
        for _ in 0..6 {
            let booking = service
                .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
                .await
                .unwrap();
            booking_ids.push(booking.booking_id);
        }

        let tasks: Vec<_> = booking_ids
            .iter()
            .map(|&id| {
                let service = service.clone();
                tokio::spawn(async move { service.set_status(mentor, id, confirm_request()).await })
            })
            .collect();

        let mut confirmed = 0;
        let mut capacity_errors = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(WorkshopError::CapacityExceeded) => capacity_errors += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(confirmed, 2);
        assert_eq!(capacity_errors, 4);

        let occupied = store
            .bookings_for_workshop(workshop.workshop_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.status.occupies_slot())
            .count();
        assert_eq!(occupied, 2);
    }

    #[tokio::test]
    async fn terminal_states_admit_no_further_transitions() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let student = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, true);
        seed_workshop(&store, &workshop).await;

        let booking = service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        service
            .set_status(mentor, booking.booking_id, confirm_request())
            .await
            .unwrap();
        service
            .set_status(
                mentor,
                booking.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Completed,
                    meeting_link: None,
                },
            )
            .await
            .unwrap();

        for target in [
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let err = service
                .set_status(
                    mentor,
                    booking.booking_id,
                    UpdateBookingStatusRequest {
                        target,
                        meeting_link: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(
                matches!(err, WorkshopError::InvalidTransition { .. }),
                "expected InvalidTransition for target {target}"
            );
        }

        // Double completion did not double-count the session.
        let achievement = store.achievement(mentor).await.unwrap().unwrap();
        assert_eq!(achievement.total_sessions_conducted, 1);
    }

    #[tokio::test]
    async fn completing_before_the_workshop_ends_is_rejected() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, false); // in the future
        seed_workshop(&store, &workshop).await;

        let booking = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        service
            .set_status(mentor, booking.booking_id, confirm_request())
            .await
            .unwrap();

        let err = service
            .set_status(
                mentor,
                booking.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Completed,
                    meeting_link: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn mentor_completing_the_workshop_completes_confirmed_bookings_only() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, false);
        seed_workshop(&store, &workshop).await;

        let confirmed = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        let pending = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        service
            .set_status(mentor, confirmed.booking_id, confirm_request())
            .await
            .unwrap();

        // Explicit mentor trigger works before the scheduled end time.
        let result = service
            .complete_workshop(mentor, workshop.workshop_id)
            .await
            .unwrap();
        assert_eq!(result.completed_bookings, 1);

        let bookings = store
            .bookings_for_workshop(workshop.workshop_id)
            .await
            .unwrap();
        let by_id = |id: Uuid| bookings.iter().find(|b| b.booking_id == id).unwrap().status;
        assert_eq!(by_id(confirmed.booking_id), BookingStatus::Completed);
        assert_eq!(by_id(pending.booking_id), BookingStatus::Pending);

        assert!(!store.workshop(workshop.workshop_id).await.unwrap().unwrap().is_active);

        let achievement = store.achievement(mentor).await.unwrap().unwrap();
        assert_eq!(achievement.total_sessions_conducted, 1);
    }

    #[tokio::test]
    async fn only_the_mentor_may_confirm() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let student = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, false);
        seed_workshop(&store, &workshop).await;

        let booking = service
            .create_booking(student, workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();

        let err = service
            .set_status(student, booking.booking_id, confirm_request())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::Forbidden(_)));
    }

    #[tokio::test]
    async fn confirm_with_meeting_link_stores_it_on_the_workshop() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let workshop = workshop_fixture(mentor, 5, false);
        seed_workshop(&store, &workshop).await;

        let booking = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        service
            .set_status(
                mentor,
                booking.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Confirmed,
                    meeting_link: Some("https://meet.alumnet.dev/xyz".to_string()),
                },
            )
            .await
            .unwrap();

        let stored = store.workshop(workshop.workshop_id).await.unwrap().unwrap();
        assert_eq!(
            stored.meeting_link.as_deref(),
            Some("https://meet.alumnet.dev/xyz")
        );
    }

    #[tokio::test]
    async fn failed_confirm_leaves_the_meeting_link_untouched() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();
        let mut workshop = workshop_fixture(mentor, 1, false);
        workshop.meeting_link = Some("https://meet.alumnet.dev/original".to_string());
        seed_workshop(&store, &workshop).await;

        let first = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        let second = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        service
            .set_status(mentor, first.booking_id, confirm_request())
            .await
            .unwrap();

        let err = service
            .set_status(
                mentor,
                second.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Confirmed,
                    meeting_link: Some("https://meet.alumnet.dev/other".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::CapacityExceeded));

        // The rejected confirm must not have written anything.
        let stored = store.workshop(workshop.workshop_id).await.unwrap().unwrap();
        assert_eq!(
            stored.meeting_link.as_deref(),
            Some("https://meet.alumnet.dev/original")
        );
    }

    #[tokio::test]
    async fn meeting_link_must_be_a_url() {
        let (store, service) = service();
        let mentor = Uuid::new_v4();

        let request = CreateWorkshopRequest {
            title: "Intro to data engineering".to_string(),
            description: None,
            scheduled_date: Utc::now() + Duration::days(1),
            duration_minutes: 60,
            max_participants: 10,
            is_paid: false,
            price: None,
            meeting_link: Some("meet me in the library".to_string()),
        };
        let err = service.create_workshop(mentor, request).await.unwrap_err();
        assert!(matches!(err, WorkshopError::Validation(_)));

        // Same constraint on the confirm path.
        let workshop = workshop_fixture(mentor, 5, false);
        seed_workshop(&store, &workshop).await;
        let booking = service
            .create_booking(Uuid::new_v4(), workshop.workshop_id, CreateBookingRequest::default())
            .await
            .unwrap();
        let err = service
            .set_status(
                mentor,
                booking.booking_id,
                UpdateBookingStatusRequest {
                    target: BookingStatus::Confirmed,
                    meeting_link: Some("not a link".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::Validation(_)));
    }

    #[tokio::test]
    async fn paid_workshop_requires_price() {
        let (_store, service) = service();
        let request = CreateWorkshopRequest {
            title: "Mock interviews".to_string(),
            description: None,
            scheduled_date: Utc::now() + Duration::days(1),
            duration_minutes: 45,
            max_participants: 10,
            is_paid: true,
            price: None,
            meeting_link: None,
        };

        let err = service
            .create_workshop(Uuid::new_v4(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::Validation(_)));
    }
}
