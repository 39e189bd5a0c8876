//! SQLite database operations
//!
//! All database access goes through this module.
//! Per-viewer fields (`liked_by_me`, `is_following`) are computed in SQL so a
//! single query returns everything a feed page needs.

use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Columns of [`TweetRow`], minus the viewer-dependent `liked_by_me`.
const TWEET_COLUMNS: &str = r#"
    SELECT t.id, t.user_id, u.name AS user_name, u.image AS user_image,
           t.content, t.created_at,
           (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS like_count,
           EXISTS(SELECT 1 FROM likes l WHERE l.tweet_id = t.id AND l.user_id = "#;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user or refresh its name and image
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, image, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.image)
        .bind(format_timestamp(&user.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get a profile with counts as seen by `viewer_id`
    pub async fn get_profile(
        &self,
        id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<ProfileRow>, AppError> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id, u.name, u.image,
                   (SELECT COUNT(*) FROM tweets t WHERE t.user_id = u.id) AS tweets_count,
                   (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers_count,
                   (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS follows_count,
                   EXISTS(
                       SELECT 1 FROM follows f
                       WHERE f.following_id = u.id AND f.follower_id = ?
                   ) AS is_following
            FROM users u
            WHERE u.id = ?
            "#,
        )
        .bind(viewer_id.unwrap_or_default())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    /// Insert tweet
    pub async fn insert_tweet(
        &self,
        id: &str,
        user_id: &str,
        content: &str,
        created_at: &chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO tweets (id, user_id, content, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(content)
            .bind(format_timestamp(created_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get tweet by ID as seen by `viewer_id`
    pub async fn get_tweet(
        &self,
        id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<TweetRow>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(TWEET_COLUMNS);
        builder.push_bind(viewer_id.unwrap_or_default().to_string());
        builder.push(") AS liked_by_me FROM tweets t JOIN users u ON u.id = t.user_id WHERE t.id = ");
        builder.push_bind(id.to_string());

        let tweet = builder
            .build_query_as::<TweetRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(tweet)
    }

    /// List one window of a feed
    ///
    /// Ordered by (created_at desc, id desc). With a cursor, the window starts
    /// at the cursor tweet (inclusive).
    ///
    /// # Arguments
    /// * `filter` - Which tweets the feed contains
    /// * `viewer_id` - Viewer for `liked_by_me`
    /// * `cursor` - Start position, or None for the newest tweet
    /// * `limit` - Maximum number of rows
    pub async fn list_tweets(
        &self,
        filter: &FeedFilter,
        viewer_id: Option<&str>,
        cursor: Option<&FeedCursor>,
        limit: usize,
    ) -> Result<Vec<TweetRow>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(TWEET_COLUMNS);
        builder.push_bind(viewer_id.unwrap_or_default().to_string());
        builder.push(") AS liked_by_me FROM tweets t JOIN users u ON u.id = t.user_id WHERE 1 = 1");

        match filter {
            FeedFilter::All => {}
            FeedFilter::FollowedBy(follower_id) => {
                builder.push(
                    " AND t.user_id IN (SELECT following_id FROM follows WHERE follower_id = ",
                );
                builder.push_bind(follower_id.clone());
                builder.push(")");
            }
            FeedFilter::Author(author_id) => {
                builder.push(" AND t.user_id = ");
                builder.push_bind(author_id.clone());
            }
        }

        if let Some(cursor) = cursor {
            let created_at = format_timestamp(&cursor.created_at);
            builder.push(" AND (t.created_at < ");
            builder.push_bind(created_at.clone());
            builder.push(" OR (t.created_at = ");
            builder.push_bind(created_at);
            builder.push(" AND t.id <= ");
            builder.push_bind(cursor.id.clone());
            builder.push("))");
        }

        builder.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ");
        builder.push_bind(limit as i64);

        let tweets = builder
            .build_query_as::<TweetRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(tweets)
    }

    /// Check whether a tweet exists
    pub async fn tweet_exists(&self, id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    // =========================================================================
    // Likes / Follows
    // =========================================================================

    /// Flip the like relation (user, tweet)
    ///
    /// # Returns
    /// `true` if a like was added, `false` if one was removed
    pub async fn toggle_like(&self, user_id: &str, tweet_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND tweet_id = ?")
            .bind(user_id)
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO likes (user_id, tweet_id, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(tweet_id)
                .bind(format_timestamp(&now_timestamp()))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    /// Flip the follow relation (follower -> following)
    ///
    /// # Returns
    /// `true` if a follow was added, `false` if one was removed
    pub async fn toggle_follow(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed =
            sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
                .bind(follower_id)
                .bind(following_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(follower_id)
            .bind(following_id)
            .bind(format_timestamp(&now_timestamp()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    /// Count users in the database
    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
