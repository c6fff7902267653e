use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use alumnet_auth::Claims;
use alumnet_common::{ApiResponse, UserRole};

use crate::error::WorkshopError;
use crate::models::{
    Achievement, AchievementResponse, Booking, CreateBookingRequest, CreateWorkshopRequest,
    Feedback, LeaderboardEntry, LeaderboardQuery, SubmitFeedbackRequest,
    UpdateBookingStatusRequest, Workshop, WorkshopCompletionResponse,
};
use crate::AppState;

fn actor_id(claims: &Claims) -> Result<Uuid, WorkshopError> {
    Ok(claims.user_id()?)
}

fn require_mentor(claims: &Claims) -> Result<Uuid, WorkshopError> {
    match claims.role {
        UserRole::Mentor | UserRole::Admin => actor_id(claims),
        UserRole::Student => Err(WorkshopError::Forbidden(
            "mentor role required".to_string(),
        )),
    }
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "workshops"
    }))
}

pub async fn create_workshop(
    State(state): State<AppState>,
    claims: Claims,
    Json(request): Json<CreateWorkshopRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Workshop>>), WorkshopError> {
    let mentor_id = require_mentor(&claims)?;
    let workshop = state.bookings.create_workshop(mentor_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(workshop))))
}

pub async fn list_workshops(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Workshop>>>, WorkshopError> {
    let workshops = state.bookings.list_workshops().await?;
    Ok(Json(ApiResponse::success(workshops)))
}

pub async fn get_workshop(
    State(state): State<AppState>,
    Path(workshop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Workshop>>, WorkshopError> {
    let workshop = state.bookings.get_workshop(workshop_id).await?;
    Ok(Json(ApiResponse::success(workshop)))
}

pub async fn create_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(workshop_id): Path<Uuid>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), WorkshopError> {
    let student_id = actor_id(&claims)?;
    let booking = state
        .bookings
        .create_booking(student_id, workshop_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(booking))))
}

pub async fn workshop_bookings(
    State(state): State<AppState>,
    claims: Claims,
    Path(workshop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, WorkshopError> {
    let mentor_id = require_mentor(&claims)?;
    let bookings = state
        .bookings
        .workshop_roster(mentor_id, workshop_id)
        .await?;
    Ok(Json(ApiResponse::success(bookings)))
}

pub async fn my_bookings(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<ApiResponse<Vec<Booking>>>, WorkshopError> {
    let student_id = actor_id(&claims)?;
    let bookings = state.bookings.student_bookings(student_id).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

pub async fn set_booking_status(
    State(state): State<AppState>,
    claims: Claims,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, WorkshopError> {
    let actor = actor_id(&claims)?;
    let booking = state.bookings.set_status(actor, booking_id, request).await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn complete_workshop(
    State(state): State<AppState>,
    claims: Claims,
    Path(workshop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<WorkshopCompletionResponse>>, WorkshopError> {
    let mentor_id = require_mentor(&claims)?;
    let result = state
        .bookings
        .complete_workshop(mentor_id, workshop_id)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    claims: Claims,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Feedback>>), WorkshopError> {
    let student_id = actor_id(&claims)?;
    let feedback = state
        .feedback
        .submit(student_id, booking_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(feedback))))
}

pub async fn mark_helpful(
    State(state): State<AppState>,
    claims: Claims,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Achievement>>, WorkshopError> {
    let voter = actor_id(&claims)?;
    if voter == mentor_id {
        return Err(WorkshopError::Forbidden(
            "mentors cannot vote for themselves".to_string(),
        ));
    }
    let achievement = state.feedback.mark_helpful(mentor_id).await?;
    Ok(Json(ApiResponse::success(achievement)))
}

pub async fn mentor_achievements(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AchievementResponse>>, WorkshopError> {
    let snapshot = state.reputation.achievement_snapshot(mentor_id).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>, WorkshopError> {
    let limit = query
        .limit
        .unwrap_or(state.config.leaderboard_default_limit)
        .max(0);
    let entries = state.leaderboard.top(Some(limit)).await?;
    Ok(Json(ApiResponse::success(entries)))
}
