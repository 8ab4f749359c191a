use crate::db::{follow_repo, user_repo};
use crate::error::{AppError, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Result of a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Users cannot follow themselves; nothing was stored
    SelfFollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FollowCounts {
    pub followers: i64,
    pub following: i64,
}

#[derive(Clone)]
pub struct FollowService {
    pool: SqlitePool,
}

impl FollowService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent follow. Only an unknown author is an error.
    pub async fn follow(&self, follower_id: i64, username: &str) -> Result<FollowOutcome> {
        let author = user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{}'", username)))?;

        if author.id == follower_id {
            debug!(user_id = follower_id, "Ignoring self-follow");
            return Ok(FollowOutcome::SelfFollow);
        }

        if follow_repo::insert_follow(&self.pool, follower_id, author.id).await? {
            info!(follower_id, author_id = author.id, "Follow created");
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Idempotent unfollow; returns whether an edge was removed. Unknown
    /// authors are treated like authors the caller does not follow.
    pub async fn unfollow(&self, follower_id: i64, username: &str) -> Result<bool> {
        let Some(author) = user_repo::find_by_username(&self.pool, username).await? else {
            debug!(follower_id, username, "Unfollow of unknown author");
            return Ok(false);
        };

        let removed = follow_repo::delete_follow(&self.pool, follower_id, author.id).await?;
        if removed {
            info!(follower_id, author_id = author.id, "Follow removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::follow_exists(&self.pool, follower_id, author_id).await?)
    }

    pub async fn counts(&self, user_id: i64) -> Result<FollowCounts> {
        Ok(FollowCounts {
            followers: follow_repo::count_followers(&self.pool, user_id).await?,
            following: follow_repo::count_following(&self.pool, user_id).await?,
        })
    }
}
