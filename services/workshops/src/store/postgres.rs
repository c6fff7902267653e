use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use alumnet_common::AppError;

use crate::models::{
    Achievement, Badge, Booking, BookingStatus, Feedback, LeaderboardEntry, Workshop,
};
use crate::store::{ConfirmOutcome, WorkshopStore};

/// Postgres-backed store. Capacity and feedback guards are single conditional
/// UPDATE statements so two racing requests cannot both pass a stale check.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WorkshopRow {
    workshop_id: Uuid,
    mentor_id: Uuid,
    title: String,
    description: Option<String>,
    scheduled_date: DateTime<Utc>,
    duration_minutes: i32,
    max_participants: i32,
    is_paid: bool,
    price: Option<Decimal>,
    meeting_link: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkshopRow> for Workshop {
    fn from(row: WorkshopRow) -> Self {
        Workshop {
            workshop_id: row.workshop_id,
            mentor_id: row.mentor_id,
            title: row.title,
            description: row.description,
            scheduled_date: row.scheduled_date,
            duration_minutes: row.duration_minutes,
            max_participants: row.max_participants,
            is_paid: row.is_paid,
            price: row.price,
            meeting_link: row.meeting_link,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    booking_id: Uuid,
    workshop_id: Uuid,
    student_id: Uuid,
    status: String,
    notes: Option<String>,
    feedback_submitted: bool,
    booked_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        // Reject stored values outside the closed status set.
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(AppError::Internal)?;
        Ok(Booking {
            booking_id: row.booking_id,
            workshop_id: row.workshop_id,
            student_id: row.student_id,
            status,
            notes: row.notes,
            feedback_submitted: row.feedback_submitted,
            booked_at: row.booked_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AchievementRow {
    mentor_id: Uuid,
    total_sessions_conducted: i64,
    average_rating: f64,
    total_ratings: i64,
    total_helpful_votes: i64,
    leaderboard_points: f64,
    badges: serde_json::Value,
}

impl AchievementRow {
    fn into_achievement(self) -> (Uuid, Achievement) {
        let badges: BTreeSet<Badge> = match serde_json::from_value(self.badges) {
            Ok(badges) => badges,
            Err(e) => {
                tracing::warn!(mentor_id = %self.mentor_id, "unreadable badge set, treating as empty: {}", e);
                BTreeSet::new()
            }
        };
        (
            self.mentor_id,
            Achievement {
                total_sessions_conducted: self.total_sessions_conducted,
                average_rating: self.average_rating,
                total_ratings: self.total_ratings,
                total_helpful_votes: self.total_helpful_votes,
                leaderboard_points: self.leaderboard_points,
                badges,
            },
        )
    }
}

#[derive(sqlx::FromRow)]
struct LeaderboardRow {
    mentor_id: Uuid,
    rank: i64,
    points: f64,
    average_rating: f64,
    total_sessions_conducted: i64,
    badges: serde_json::Value,
}

const SELECT_BOOKING: &str = r#"
    SELECT booking_id, workshop_id, student_id, status, notes,
           feedback_submitted, booked_at, updated_at
    FROM bookings
"#;

#[async_trait]
impl WorkshopStore for PgStore {
    async fn insert_workshop(&self, workshop: &Workshop) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO workshops (
                workshop_id, mentor_id, title, description, scheduled_date,
                duration_minutes, max_participants, is_paid, price,
                meeting_link, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(workshop.workshop_id)
        .bind(workshop.mentor_id)
        .bind(&workshop.title)
        .bind(&workshop.description)
        .bind(workshop.scheduled_date)
        .bind(workshop.duration_minutes)
        .bind(workshop.max_participants)
        .bind(workshop.is_paid)
        .bind(workshop.price)
        .bind(&workshop.meeting_link)
        .bind(workshop.is_active)
        .bind(workshop.created_at)
        .bind(workshop.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn workshop(&self, workshop_id: Uuid) -> Result<Option<Workshop>, AppError> {
        let row = sqlx::query_as::<_, WorkshopRow>(
            "SELECT * FROM workshops WHERE workshop_id = $1",
        )
        .bind(workshop_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Workshop::from))
    }

    async fn list_active_workshops(&self) -> Result<Vec<Workshop>, AppError> {
        let rows = sqlx::query_as::<_, WorkshopRow>(
            "SELECT * FROM workshops WHERE is_active ORDER BY scheduled_date",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Workshop::from).collect())
    }

    async fn set_workshop_active(
        &self,
        workshop_id: Uuid,
        is_active: bool,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE workshops SET is_active = $2, updated_at = $3 WHERE workshop_id = $1")
            .bind(workshop_id)
            .bind(is_active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_meeting_link(&self, workshop_id: Uuid, link: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE workshops SET meeting_link = $2, updated_at = $3 WHERE workshop_id = $1",
        )
        .bind(workshop_id)
        .bind(link)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mentor_has_workshops(&self, mentor_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM workshops WHERE mentor_id = $1)",
        )
        .bind(mentor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id, workshop_id, student_id, status, notes,
                feedback_submitted, booked_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.booking_id)
        .bind(booking.workshop_id)
        .bind(booking.student_id)
        .bind(booking.status.as_str())
        .bind(&booking.notes)
        .bind(booking.feedback_submitted)
        .bind(booking.booked_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn booking(&self, booking_id: Uuid) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(
            &format!("{SELECT_BOOKING} WHERE booking_id = $1"),
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn bookings_for_workshop(&self, workshop_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKING} WHERE workshop_id = $1 ORDER BY booked_at, booking_id"
        ))
        .bind(workshop_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn bookings_for_student(&self, student_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{SELECT_BOOKING} WHERE student_id = $1 ORDER BY booked_at, booking_id"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn has_active_booking(
        &self,
        workshop_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE workshop_id = $1 AND student_id = $2 AND status <> 'Cancelled'
            )
            "#,
        )
        .bind(workshop_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn confirm_booking(&self, booking_id: Uuid) -> Result<ConfirmOutcome, AppError> {
        // The capacity check and the transition are one statement; two racing
        // confirms cannot both see a free slot.
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            UPDATE bookings b
            SET status = 'Confirmed', updated_at = $2
            WHERE b.booking_id = $1
              AND b.status = 'Pending'
              AND (
                    SELECT COUNT(*) FROM bookings c
                    WHERE c.workshop_id = b.workshop_id
                      AND c.status IN ('Confirmed', 'Completed')
                  ) < (
                    SELECT w.max_participants FROM workshops w
                    WHERE w.workshop_id = b.workshop_id
                  )
            RETURNING booking_id, workshop_id, student_id, status, notes,
                      feedback_submitted, booked_at, updated_at
            "#,
        )
        .bind(booking_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(ConfirmOutcome::Confirmed(Booking::try_from(row)?));
        }

        // Nothing updated: work out which guard failed.
        match self.booking(booking_id).await? {
            None => Ok(ConfirmOutcome::NotFound),
            Some(booking) if booking.status != BookingStatus::Pending => {
                Ok(ConfirmOutcome::InvalidState(booking.status))
            }
            Some(_) => Ok(ConfirmOutcome::CapacityExceeded),
        }
    }

    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, updated_at = $4 WHERE booking_id = $1 AND status = $2",
        )
        .bind(booking_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn claim_feedback_slot(&self, booking_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET feedback_submitted = TRUE, updated_at = $2
            WHERE booking_id = $1 AND feedback_submitted = FALSE
            "#,
        )
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_feedback_slot(&self, booking_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE bookings SET feedback_submitted = FALSE, updated_at = $2
            WHERE booking_id = $1 AND feedback_submitted = TRUE
            "#,
        )
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        // ON CONFLICT keeps a retried submission from violating the unique
        // booking constraint after a partial failure.
        sqlx::query(
            r#"
            INSERT INTO feedback (
                feedback_id, booking_id, workshop_id, mentor_id, student_id,
                rating, comment, submitted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (booking_id) DO NOTHING
            "#,
        )
        .bind(feedback.feedback_id)
        .bind(feedback.booking_id)
        .bind(feedback.workshop_id)
        .bind(feedback.mentor_id)
        .bind(feedback.student_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn achievement(&self, mentor_id: Uuid) -> Result<Option<Achievement>, AppError> {
        let row = sqlx::query_as::<_, AchievementRow>(
            r#"
            SELECT mentor_id, total_sessions_conducted, average_rating,
                   total_ratings, total_helpful_votes, leaderboard_points, badges
            FROM achievements WHERE mentor_id = $1
            "#,
        )
        .bind(mentor_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| row.into_achievement().1))
    }

    async fn save_achievement(
        &self,
        mentor_id: Uuid,
        achievement: &Achievement,
    ) -> Result<(), AppError> {
        let badges = serde_json::to_value(&achievement.badges)
            .map_err(|e| AppError::Internal(format!("badge serialization failed: {}", e)))?;
        sqlx::query(
            r#"
            INSERT INTO achievements (
                mentor_id, total_sessions_conducted, average_rating,
                total_ratings, total_helpful_votes, leaderboard_points,
                badges, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (mentor_id) DO UPDATE SET
                total_sessions_conducted = EXCLUDED.total_sessions_conducted,
                average_rating = EXCLUDED.average_rating,
                total_ratings = EXCLUDED.total_ratings,
                total_helpful_votes = EXCLUDED.total_helpful_votes,
                leaderboard_points = EXCLUDED.leaderboard_points,
                badges = EXCLUDED.badges,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(mentor_id)
        .bind(achievement.total_sessions_conducted)
        .bind(achievement.average_rating)
        .bind(achievement.total_ratings)
        .bind(achievement.total_helpful_votes)
        .bind(achievement.leaderboard_points)
        .bind(badges)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn all_achievements(&self) -> Result<Vec<(Uuid, Achievement)>, AppError> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r#"
            SELECT mentor_id, total_sessions_conducted, average_rating,
                   total_ratings, total_helpful_votes, leaderboard_points, badges
            FROM achievements
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AchievementRow::into_achievement).collect())
    }

    async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT mentor_id, rank, points, average_rating,
                   total_sessions_conducted, badges
            FROM leaderboard_entries
            ORDER BY rank
            LIMIT $1
            "#,
        )
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let badges = serde_json::from_value(row.badges).unwrap_or_else(|e| {
                    tracing::warn!(mentor_id = %row.mentor_id, "unreadable badge set on leaderboard row: {}", e);
                    Default::default()
                });
                LeaderboardEntry {
                    rank: row.rank,
                    mentor_id: row.mentor_id,
                    points: row.points,
                    average_rating: row.average_rating,
                    total_sessions_conducted: row.total_sessions_conducted,
                    badges,
                }
            })
            .collect())
    }

    async fn replace_leaderboard(&self, entries: &[LeaderboardEntry]) -> Result<(), AppError> {
        // One transaction: readers see either the old ranking or the new one,
        // never a partially applied recompute.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM leaderboard_entries")
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            let badges = serde_json::to_value(&entry.badges)
                .map_err(|e| AppError::Internal(format!("badge serialization failed: {}", e)))?;
            sqlx::query(
                r#"
                INSERT INTO leaderboard_entries (
                    mentor_id, rank, points, average_rating,
                    total_sessions_conducted, badges
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(entry.mentor_id)
            .bind(entry.rank)
            .bind(entry.points)
            .bind(entry.average_rating)
            .bind(entry.total_sessions_conducted)
            .bind(badges)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
