/// Feed composer - reverse-chronological, paginated post listings
use crate::db::post_repo::{self, PostScope};
use crate::db::{follow_repo, group_repo, user_repo};
use crate::error::{AppError, Result};
use crate::metrics::feed::FEED_REQUESTS_TOTAL;
use crate::models::{Group, PostView, User};
use crate::services::pagination::{Page, Paginator};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

/// Group page: the group plus one page of its posts
#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

/// Author page
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: User,
    /// Whether the viewer follows the author; false for anonymous viewers and
    /// for the author's own profile
    pub following: bool,
    pub page: Page<PostView>,
}

#[derive(Clone)]
pub struct FeedService {
    pool: SqlitePool,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(pool: SqlitePool, paginator: Paginator) -> Self {
        Self { pool, paginator }
    }

    /// Every post
    pub async fn global(&self, raw_page: Option<&str>) -> Result<Page<PostView>> {
        FEED_REQUESTS_TOTAL.with_label_values(&["global"]).inc();
        self.scoped(PostScope::All, raw_page).await
    }

    pub async fn group(&self, slug: &str, raw_page: Option<&str>) -> Result<GroupFeed> {
        FEED_REQUESTS_TOTAL.with_label_values(&["group"]).inc();
        let group = group_repo::find_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group '{}'", slug)))?;

        let page = self.scoped(PostScope::Group(group.id), raw_page).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<i64>,
        raw_page: Option<&str>,
    ) -> Result<ProfileFeed> {
        FEED_REQUESTS_TOTAL.with_label_values(&["profile"]).inc();
        let author = user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{}'", username)))?;

        let following = match viewer_id {
            Some(viewer_id) if viewer_id != author.id => {
                follow_repo::follow_exists(&self.pool, viewer_id, author.id).await?
            }
            _ => false,
        };

        let page = self.scoped(PostScope::Author(author.id), raw_page).await?;
        Ok(ProfileFeed {
            author,
            following,
            page,
        })
    }

    /// Posts by the authors `viewer_id` follows
    pub async fn following(&self, viewer_id: i64, raw_page: Option<&str>) -> Result<Page<PostView>> {
        FEED_REQUESTS_TOTAL.with_label_values(&["following"]).inc();
        self.scoped(PostScope::FollowedBy(viewer_id), raw_page).await
    }

    /// Count and window read in one transaction so navigation matches the items
    async fn scoped(&self, scope: PostScope, raw_page: Option<&str>) -> Result<Page<PostView>> {
        let mut tx = self.pool.begin().await?;

        let total = post_repo::count_posts(&mut *tx, scope).await?;
        let total = usize::try_from(total).map_err(|_| {
            AppError::Internal(format!("negative post count for {:?}", scope))
        })?;
        let window = self.paginator.resolve(raw_page, total);

        let items = if window.limit == 0 {
            Vec::new()
        } else {
            post_repo::list_posts(&mut *tx, scope, window.limit as i64, window.offset as i64)
                .await?
        };
        tx.commit().await?;

        debug!(
            ?scope,
            page = window.number,
            num_pages = window.num_pages,
            items = items.len(),
            "Feed page composed"
        );
        Ok(self.paginator.page_from_window(items, window, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use chrono::{Duration, Utc};

    async fn setup() -> (SqlitePool, FeedService) {
        let pool = memory_pool().await.unwrap();
        let service = FeedService::new(pool.clone(), Paginator::new(10));
        (pool, service)
    }

    async fn post_at(pool: &SqlitePool, author: i64, group: Option<i64>, n: i64) -> i64 {
        let when = Utc::now() - Duration::hours(1) + Duration::seconds(n);
        post_repo::create_post(pool, author, &format!("post {n}"), group, None, when)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_global_pages() {
        let (pool, feed) = setup().await;
        let author = user_repo::create_user(&pool, "author").await.unwrap();
        for n in 0..23 {
            post_at(&pool, author.id, None, n).await;
        }

        let sizes = [
            feed.global(Some("1")).await.unwrap().len(),
            feed.global(Some("2")).await.unwrap().len(),
            feed.global(Some("3")).await.unwrap().len(),
        ];
        assert_eq!(sizes, [10, 10, 3]);

        let first = feed.global(None).await.unwrap();
        assert_eq!(first.items[0].text, "post 22");
        assert_eq!(feed.global(Some("42")).await.unwrap().number, 3);
    }

    #[tokio::test]
    async fn test_navigation_matches_items_after_delete() {
        let (pool, feed) = setup().await;
        let author = user_repo::create_user(&pool, "author").await.unwrap();
        for n in 0..12 {
            post_at(&pool, author.id, None, n).await;
        }

        let before = feed.global(Some("2")).await.unwrap();
        assert_eq!((before.number, before.num_pages, before.len()), (2, 2, 2));

        // The read transaction has released the only connection
        post_repo::delete_all_posts(&pool).await.unwrap();

        let after = feed.global(Some("2")).await.unwrap();
        assert_eq!((after.number, after.num_pages, after.total), (1, 1, 0));
        assert!(after.is_empty() && !after.has_next);
    }

    #[tokio::test]
    async fn test_group_feed_is_isolated() {
        let (pool, feed) = setup().await;
        let author = user_repo::create_user(&pool, "author").await.unwrap();
        let cats = group_repo::create_group(&pool, "Cats", "cats", "").await.unwrap();
        let dogs = group_repo::create_group(&pool, "Dogs", "dogs", "").await.unwrap();
        let cat_post = post_at(&pool, author.id, Some(cats.id), 1).await;
        post_at(&pool, author.id, Some(dogs.id), 2).await;

        let result = feed.group("cats", None).await.unwrap();

        assert_eq!(result.group.slug, "cats");
        let ids: Vec<i64> = result.page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![cat_post]);
    }

    #[tokio::test]
    async fn test_unknown_group_or_user_is_not_found() {
        let (_pool, feed) = setup().await;
        assert!(matches!(
            feed.group("missing", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            feed.profile("ghost", None, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_following_flag() {
        let (pool, feed) = setup().await;
        let author = user_repo::create_user(&pool, "author").await.unwrap();
        let reader = user_repo::create_user(&pool, "reader").await.unwrap();

        assert!(!feed.profile("author", None, None).await.unwrap().following);
        assert!(!feed.profile("author", Some(reader.id), None).await.unwrap().following);

        follow_repo::insert_follow(&pool, reader.id, author.id).await.unwrap();
        assert!(feed.profile("author", Some(reader.id), None).await.unwrap().following);
        assert!(!feed.profile("author", Some(author.id), None).await.unwrap().following);
    }

    #[tokio::test]
    async fn test_following_feed() {
        let (pool, feed) = setup().await;
        let reader = user_repo::create_user(&pool, "reader").await.unwrap();
        let followed = user_repo::create_user(&pool, "followed").await.unwrap();
        let stranger = user_repo::create_user(&pool, "stranger").await.unwrap();

        assert!(feed.following(reader.id, None).await.unwrap().is_empty());

        follow_repo::insert_follow(&pool, reader.id, followed.id).await.unwrap();
        let expected = post_at(&pool, followed.id, None, 1).await;
        post_at(&pool, stranger.id, None, 2).await;

        let page = feed.following(reader.id, None).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![expected]);
    }
}
