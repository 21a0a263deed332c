//! Post/category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the post lifecycle and its category links.
//! - Delete a post together with its comments, reactions and notifications.
//!
//! # Invariants
//! - Title and description are validated and stored trimmed.
//! - Category names are normalized to lowercase and deduplicated.
//! - `create_post` and `delete_post` each run in one immediate transaction.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::validation::{validate_field, ValidationError};
use crate::repo::error::{EntityRef, StorageContext, StoreError, StoreResult};
use crate::repo::{begin_immediate, ensure_connection_ready, notification_repo, reaction_repo};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::time::Instant;

const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    image,
    author,
    likes,
    dislikes,
    created_at
FROM post";

/// Repository interface for posts and their categories.
pub trait PostRepository {
    /// Creates one post with its categories and returns its id.
    fn create_post(&self, post: &NewPost) -> StoreResult<PostId>;
    /// Gets one post by id.
    fn get_post(&self, post_id: PostId) -> StoreResult<Post>;
    /// Lists all posts in creation order.
    fn list_posts(&self) -> StoreResult<Vec<Post>>;
    /// Lists posts tagged with `category`, in creation order.
    fn list_posts_by_category(&self, category: &str) -> StoreResult<Vec<Post>>;
    /// Returns all known category names sorted by name.
    fn list_categories(&self) -> StoreResult<Vec<String>>;
    /// Deletes the post and everything that hangs off it atomically.
    fn delete_post(&self, post_id: PostId) -> StoreResult<()>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> StoreResult<PostId> {
        let title = validate_field("title", &post.title)?;
        let description = validate_field("description", &post.description)?;
        let categories = normalize_categories(&post.categories)?;
        let image = post
            .image
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let tx = begin_immediate(self.conn).context("create_post.begin")?;
        tx.execute(
            "INSERT INTO post (title, description, image, author) VALUES (?1, ?2, ?3, ?4);",
            params![title, description, image, post.author],
        )
        .context("create_post.insert")?;
        let post_id = tx.last_insert_rowid();

        for name in &categories {
            tx.execute("INSERT OR IGNORE INTO category (name) VALUES (?1);", [name])
                .context("create_post.category")?;
            tx.execute(
                "INSERT INTO post_category (post_id, category_id)
                 SELECT ?1, id
                 FROM category
                 WHERE name = ?2 COLLATE NOCASE;",
                params![post_id, name],
            )
            .context("create_post.category_link")?;
        }

        tx.commit().context("create_post.commit")?;
        Ok(post_id)
    }

    fn get_post(&self, post_id: PostId) -> StoreResult<Post> {
        let post = self
            .conn
            .query_row(
                &format!("{POST_SELECT_SQL} WHERE id = ?1;"),
                [post_id],
                parse_post_row,
            )
            .optional()
            .context("get_post")?
            .ok_or(StoreError::NotFound(EntityRef::Post(post_id)))?;

        with_categories(self.conn, post)
    }

    fn list_posts(&self) -> StoreResult<Vec<Post>> {
        query_posts(self.conn, &format!("{POST_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn list_posts_by_category(&self, category: &str) -> StoreResult<Vec<Post>> {
        let Some(name) = normalize_category(category) else {
            return Ok(Vec::new());
        };
        query_posts(
            self.conn,
            &format!(
                "{POST_SELECT_SQL}
                 WHERE EXISTS (
                    SELECT 1
                    FROM post_category pc
                    INNER JOIN category c ON c.id = pc.category_id
                    WHERE pc.post_id = post.id
                      AND c.name = ?1 COLLATE NOCASE
                 )
                 ORDER BY id ASC;"
            ),
            [name],
        )
    }

    fn list_categories(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM category ORDER BY name COLLATE NOCASE ASC;")
            .context("list_categories")?;
        let mut rows = stmt.query([]).context("list_categories")?;
        let mut names = Vec::new();
        while let Some(row) = rows.next().context("list_categories")? {
            let name: String = row.get(0).context("list_categories")?;
            names.push(name.to_lowercase());
        }
        Ok(names)
    }

    fn delete_post(&self, post_id: PostId) -> StoreResult<()> {
        let started_at = Instant::now();
        match delete_post_cascade(self.conn, post_id) {
            Ok(comments) => {
                info!(
                    "event=post_delete module=repo status=ok post_id={} comments_removed={} duration_ms={}",
                    post_id,
                    comments,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err @ StoreError::NotFound(_)) => {
                info!("event=post_delete module=repo status=not_found post_id={post_id}");
                Err(err)
            }
            Err(err) => {
                error!(
                    "event=post_delete module=repo status=error post_id={} duration_ms={} error_code={} error={}",
                    post_id,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Normalizes one category name; blank names yield `None`.
pub fn normalize_category(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates category names, rejecting blank entries.
pub fn normalize_categories(names: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut unique = BTreeSet::new();
    for name in names {
        let value = normalize_category(name)
            .ok_or(ValidationError::EmptyText { field: "category" })?;
        unique.insert(value);
    }
    Ok(unique.into_iter().collect())
}

/// Returns the number of comments removed with the post.
fn delete_post_cascade(conn: &Connection, post_id: PostId) -> StoreResult<usize> {
    let tx = begin_immediate(conn).context("delete_post.begin")?;

    reaction_repo::delete_for_post(&tx, post_id).context("delete_post.reactions")?;
    notification_repo::delete_for_post(&tx, post_id).context("delete_post.notifications")?;
    let comments = tx
        .execute("DELETE FROM comment WHERE post_id = ?1;", [post_id])
        .context("delete_post.comments")?;
    tx.execute("DELETE FROM post_category WHERE post_id = ?1;", [post_id])
        .context("delete_post.categories")?;
    let changed = tx
        .execute("DELETE FROM post WHERE id = ?1;", [post_id])
        .context("delete_post.post")?;
    if changed == 0 {
        return Err(StoreError::NotFound(EntityRef::Post(post_id)));
    }

    tx.commit().context("delete_post.commit")?;
    Ok(comments)
}

fn query_posts<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Post>> {
    let mut stmt = conn.prepare(sql).context("list_posts")?;
    let mut rows = stmt.query(params).context("list_posts")?;
    let mut posts = Vec::new();
    while let Some(row) = rows.next().context("list_posts")? {
        posts.push(parse_post_row(row).context("list_posts")?);
    }

    posts
        .into_iter()
        .map(|post| with_categories(conn, post))
        .collect()
}

fn with_categories(conn: &Connection, mut post: Post) -> StoreResult<Post> {
    let mut stmt = conn
        .prepare(
            "SELECT c.name
             FROM post_category pc
             INNER JOIN category c ON c.id = pc.category_id
             WHERE pc.post_id = ?1
             ORDER BY c.name COLLATE NOCASE ASC;",
        )
        .context("load_categories")?;
    let mut rows = stmt.query([post.id]).context("load_categories")?;
    while let Some(row) = rows.next().context("load_categories")? {
        let name: String = row.get(0).context("load_categories")?;
        post.categories.push(name.to_lowercase());
    }
    Ok(post)
}

fn parse_post_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        image: row.get("image")?,
        categories: Vec::new(),
        author: row.get("author")?,
        likes: row.get("likes")?,
        dislikes: row.get("dislikes")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_categories, normalize_category};
    use crate::model::validation::ValidationError;

    #[test]
    fn categories_are_lowercased_and_deduplicated() {
        let normalized = normalize_categories(&[
            "Rust".to_string(),
            " rust ".to_string(),
            "Go".to_string(),
        ])
        .unwrap();
        assert_eq!(normalized, vec!["go".to_string(), "rust".to_string()]);
    }

    #[test]
    fn blank_category_is_rejected() {
        let err = normalize_categories(&["ok".to_string(), "  ".to_string()]).unwrap_err();
        assert_eq!(err, ValidationError::EmptyText { field: "category" });
        assert_eq!(normalize_category("\t"), None);
    }
}
