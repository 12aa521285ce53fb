use serde::Serialize;
use sqlx::sqlite::SqlitePool;

/// A blog post row. `content` holds the metadata copy of the body; the
/// canonical body bytes live in the object store under `object_key`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub code: String,
    pub object_key: String,
}

/// Fields for a post that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub code: String,
    pub object_key: String,
}

/// Insert a post row and return its id.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO posts (title, content, code, object_key) VALUES (?, ?, ?, ?)",
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.code)
    .bind(&post.object_key)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch a post by id. Returns `sqlx::Error::RowNotFound` for unknown ids.
pub async fn find_post(pool: &SqlitePool, id: i64) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT id, title, content, code, object_key FROM posts WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}
