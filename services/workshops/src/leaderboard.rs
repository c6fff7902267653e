use std::cmp::Ordering;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::WorkshopError;
use crate::models::{Achievement, LeaderboardEntry};
use crate::store::WorkshopStore;

/// The sole ranking signal.
pub fn points(achievement: &Achievement) -> f64 {
    achievement.average_rating * achievement.total_sessions_conducted as f64
}

/// Order a snapshot of the achievement set into a densely ranked list:
/// points descending, ties broken by mentor-ID ascending, ranks exactly
/// 1..=N. Mentors whose record produces a non-finite score are skipped with
/// a warning; partial ranking beats no ranking.
pub fn rank_entries(snapshot: Vec<(Uuid, Achievement)>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = snapshot
        .into_iter()
        .filter_map(|(mentor_id, achievement)| {
            let points = points(&achievement);
            if !points.is_finite() {
                tracing::warn!(
                    mentor_id = %mentor_id,
                    "skipping mentor with malformed achievement record during rank recompute"
                );
                return None;
            }
            Some(LeaderboardEntry {
                rank: 0,
                mentor_id,
                points,
                average_rating: achievement.average_rating,
                total_sessions_conducted: achievement.total_sessions_conducted,
                badges: achievement.badges,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.mentor_id.cmp(&b.mentor_id))
    });

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as i64 + 1;
    }
    entries
}

/// Batch recompute over the full, authoritative achievement set. No
/// incremental rank maintenance; rank collisions cannot happen because every
/// recompute starts from scratch.
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn WorkshopStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn WorkshopStore>) -> Self {
        Self { store }
    }

    pub async fn recalculate_ranks(&self) -> Result<Vec<LeaderboardEntry>, WorkshopError> {
        let snapshot = self.store.all_achievements().await?;
        let entries = rank_entries(snapshot);
        self.store.replace_leaderboard(&entries).await?;
        Ok(entries)
    }

    pub async fn top(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, WorkshopError> {
        Ok(self.store.leaderboard(limit).await?)
    }
}
