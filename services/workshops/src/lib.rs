use std::sync::Arc;

use alumnet_auth::JwtService;

pub mod bookings;
pub mod config;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod leaderboard;
pub mod models;
pub mod reputation;
pub mod routes;
pub mod store;

use bookings::BookingService;
use config::WorkshopsConfig;
use feedback::FeedbackService;
use leaderboard::LeaderboardService;
use reputation::ReputationService;
use store::WorkshopStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WorkshopsConfig>,
    pub jwt_service: JwtService,
    pub bookings: BookingService,
    pub feedback: FeedbackService,
    pub reputation: ReputationService,
    pub leaderboard: LeaderboardService,
}

impl AppState {
    pub fn new(
        config: WorkshopsConfig,
        jwt_service: JwtService,
        store: Arc<dyn WorkshopStore>,
    ) -> Self {
        let leaderboard = LeaderboardService::new(store.clone());
        let reputation = ReputationService::new(store.clone(), leaderboard.clone());
        let bookings = BookingService::new(store.clone(), reputation.clone());
        let feedback = FeedbackService::new(store, reputation.clone());

        Self {
            config: Arc::new(config),
            jwt_service,
            bookings,
            feedback,
            reputation,
            leaderboard,
        }
    }
}
