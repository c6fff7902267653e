use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::WorkshopError;
use crate::leaderboard::{points, LeaderboardService};
use crate::models::{Achievement, AchievementResponse, Badge, BadgeProgress};
use crate::store::WorkshopStore;

pub const STAR_MENTOR_MIN_RATING: f64 = 4.0;
pub const TOP_RATED_MIN_RATING: f64 = 4.5;
pub const FIFTY_SESSIONS_MIN: i64 = 50;
pub const HUNDRED_SESSIONS_MIN: i64 = 100;
pub const COMMUNITY_HERO_MIN_VOTES: i64 = 50;

/// Fold one rating into the running mean without replaying the feedback
/// history: `avg += (r - avg) / (n + 1)`. Numerically equivalent to a full
/// recompute over the feedback set.
pub fn apply_rating(achievement: &mut Achievement, rating: i32) {
    let n = achievement.total_ratings as f64;
    achievement.average_rating += (rating as f64 - achievement.average_rating) / (n + 1.0);
    achievement.total_ratings += 1;
}

/// Derive the badge set from the aggregate. Pure: no stored badge state is
/// consulted, so a badge disappears as soon as its metric drops below the
/// threshold.
pub fn badges_for(achievement: &Achievement) -> BTreeSet<Badge> {
    let mut badges = BTreeSet::new();
    // A mentor with no ratings yet has an average of 0.0 and earns nothing.
    if achievement.total_ratings > 0 {
        if achievement.average_rating >= STAR_MENTOR_MIN_RATING {
            badges.insert(Badge::StarMentor);
        }
        if achievement.average_rating >= TOP_RATED_MIN_RATING {
            badges.insert(Badge::TopRated);
        }
    }
    if achievement.total_sessions_conducted >= FIFTY_SESSIONS_MIN {
        badges.insert(Badge::FiftySessions);
    }
    if achievement.total_sessions_conducted >= HUNDRED_SESSIONS_MIN {
        badges.insert(Badge::HundredSessions);
    }
    if achievement.total_helpful_votes >= COMMUNITY_HERO_MIN_VOTES {
        badges.insert(Badge::CommunityHero);
    }
    badges
}

/// Progress toward each unearned badge. Derived on read, never stored.
pub fn badge_progress(achievement: &Achievement) -> Vec<BadgeProgress> {
    let earned = badges_for(achievement);
    let candidates = [
        (Badge::StarMentor, achievement.average_rating, STAR_MENTOR_MIN_RATING),
        (Badge::TopRated, achievement.average_rating, TOP_RATED_MIN_RATING),
        (
            Badge::FiftySessions,
            achievement.total_sessions_conducted as f64,
            FIFTY_SESSIONS_MIN as f64,
        ),
        (
            Badge::HundredSessions,
            achievement.total_sessions_conducted as f64,
            HUNDRED_SESSIONS_MIN as f64,
        ),
        (
            Badge::CommunityHero,
            achievement.total_helpful_votes as f64,
            COMMUNITY_HERO_MIN_VOTES as f64,
        ),
    ];

    candidates
        .into_iter()
        .filter(|(badge, _, _)| !earned.contains(badge))
        .map(|(badge, current, required)| BadgeProgress {
            badge,
            current,
            required,
        })
        .collect()
}

/// Owns every write to a mentor's achievement record. Each mutation saves the
/// aggregate with a freshly derived badge set and then triggers the global
/// rank recompute, synchronously.
#[derive(Clone)]
pub struct ReputationService {
    store: Arc<dyn WorkshopStore>,
    leaderboard: LeaderboardService,
}

impl ReputationService {
    pub fn new(store: Arc<dyn WorkshopStore>, leaderboard: LeaderboardService) -> Self {
        Self { store, leaderboard }
    }

    pub async fn record_rating(
        &self,
        mentor_id: Uuid,
        rating: i32,
    ) -> Result<Achievement, WorkshopError> {
        let mut achievement = self.load(mentor_id).await?;
        apply_rating(&mut achievement, rating);
        self.commit(mentor_id, achievement).await
    }

    pub async fn record_session(&self, mentor_id: Uuid) -> Result<Achievement, WorkshopError> {
        let mut achievement = self.load(mentor_id).await?;
        achievement.total_sessions_conducted += 1;
        self.commit(mentor_id, achievement).await
    }

    pub async fn record_helpful_vote(
        &self,
        mentor_id: Uuid,
    ) -> Result<Achievement, WorkshopError> {
        let existing = self.store.achievement(mentor_id).await?;
        // A vote for an id with no record and no workshops would mint a ghost
        // mentor onto the leaderboard.
        if existing.is_none() && !self.store.mentor_has_workshops(mentor_id).await? {
            return Err(WorkshopError::NotFound(format!("mentor {}", mentor_id)));
        }
        let mut achievement = existing.unwrap_or_default();
        achievement.total_helpful_votes += 1;
        self.commit(mentor_id, achievement).await
    }

    pub async fn achievement_snapshot(
        &self,
        mentor_id: Uuid,
    ) -> Result<AchievementResponse, WorkshopError> {
        let achievement = self.load(mentor_id).await?;
        let badge_progress = badge_progress(&achievement);
        Ok(AchievementResponse {
            mentor_id,
            achievement,
            badge_progress,
        })
    }

    async fn load(&self, mentor_id: Uuid) -> Result<Achievement, WorkshopError> {
        Ok(self.store.achievement(mentor_id).await?.unwrap_or_default())
    }

    async fn commit(
        &self,
        mentor_id: Uuid,
        mut achievement: Achievement,
    ) -> Result<Achievement, WorkshopError> {
        achievement.leaderboard_points = points(&achievement);
        achievement.badges = badges_for(&achievement);
        self.store.save_achievement(mentor_id, &achievement).await?;
        self.leaderboard.recalculate_ranks().await?;
        Ok(achievement)
    }
}
