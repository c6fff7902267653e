use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use alumnet_auth::auth_middleware;

use crate::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/workshops",
            post(handlers::create_workshop).get(handlers::list_workshops),
        )
        .route("/workshops/:id", get(handlers::get_workshop))
        .route(
            "/workshops/:id/bookings",
            post(handlers::create_booking).get(handlers::workshop_bookings),
        )
        .route("/workshops/:id/complete", post(handlers::complete_workshop))
        .route("/bookings/mine", get(handlers::my_bookings))
        .route("/bookings/:id/status", put(handlers::set_booking_status))
        .route("/bookings/:id/feedback", post(handlers::submit_feedback))
        .route("/mentors/:id/helpful", post(handlers::mark_helpful))
        .route(
            "/mentors/:id/achievements",
            get(handlers::mentor_achievements),
        )
        .route("/leaderboard", get(handlers::leaderboard))
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
}
