use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::ArticleBackend;
use crate::error::BackendError;
use crate::model::{
    Article, ArticleDraft, ArticleListPagination, ArticleRow, ArticleStatus, Page, ProjectRef,
    ProjectRow,
};

/// Article backend on top of a local SQLite database.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    pagination: ArticleListPagination,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database at `database_url` and runs migrations.
    pub async fn connect(
        database_url: &str,
        pagination: ArticleListPagination,
    ) -> Result<Self, BackendError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::migrate(pool, pagination).await
    }

    /// Private database living as long as the backend, for tests and dry runs.
    pub async fn in_memory(pagination: ArticleListPagination) -> Result<Self, BackendError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool, pagination).await
    }

    async fn migrate(
        pool: SqlitePool,
        pagination: ArticleListPagination,
    ) -> Result<Self, BackendError> {
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool, pagination })
    }

    /// Links article `id` to the project called `name`, appending it to the
    /// article's project list. Returns `false` when the article does not exist.
    pub async fn add_project(&self, id: &str, name: &str) -> Result<bool, BackendError> {
        let Some(article_id) = parse_id(id) else {
            return Ok(false);
        };
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE id = $1")
            .bind(article_id)
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("INSERT OR IGNORE INTO projects (name) VALUES ($1)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        let project_id: i64 = sqlx::query_scalar("SELECT id FROM projects WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        sqlx::query(
            "INSERT OR IGNORE INTO article_projects (article_id, project_id, position)
             VALUES ($1, $2, (SELECT COUNT(*) FROM article_projects WHERE article_id = $3))",
        )
        .bind(article_id)
        .bind(project_id)
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Linked article {} to project {}", id, name);
        Ok(true)
    }

    async fn projects_of(&self, article_id: i64) -> Result<Vec<ProjectRef>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT p.id, p.name FROM projects p
             JOIN article_projects ap ON ap.project_id = p.id
             WHERE ap.article_id = $1
             ORDER BY ap.position",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectRef {
                id: row.id.to_string(),
                name: row.name,
            })
            .collect())
    }
}

fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

#[async_trait]
impl ArticleBackend for SqliteBackend {
    async fn list(&self) -> Result<Page, BackendError> {
        let ArticleListPagination { page, per_page } = self.pagination;
        if page < 1 {
            return Err(BackendError::Read("Page should be >= 1".into()));
        }
        tracing::info!("Reading articles, page {}", page);

        let read_err = |e: sqlx::Error| {
            tracing::error!("Failed to read! {}", e);
            BackendError::Read("No such objects.".into())
        };

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(read_err)?;
        let rows = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, title, content, status FROM articles ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(per_page))
        .bind(i64::from(page - 1) * i64::from(per_page))
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let projects = self.projects_of(row.id).await.map_err(read_err)?;
            data.push(Article {
                id: row.id.to_string(),
                title: row.title,
                content: row.content,
                status: ArticleStatus::from(row.status),
                projects,
            });
        }

        Ok(Page {
            count: count.max(0) as u64,
            data,
        })
    }

    async fn create(&self, draft: &ArticleDraft) -> Result<Option<String>, BackendError> {
        tracing::info!("Creating article with title: {}!", &draft.title);
        let query = sqlx::query("INSERT INTO articles (title, content) VALUES ($1, $2)")
            .bind(&draft.title)
            .bind(&draft.content)
            .execute(&self.pool)
            .await;

        match query {
            Ok(done) => {
                let id = done.last_insert_rowid().to_string();
                tracing::info!("Created article: {} ({})", &draft.title, id);
                Ok(Some(id))
            }
            Err(e) => {
                tracing::error!("Failed to create article, Error: {}", e);
                Err(BackendError::Create("Database error".into()))
            }
        }
    }

    async fn update(
        &self,
        draft: &ArticleDraft,
        id: &str,
    ) -> Result<Option<String>, BackendError> {
        let Some(article_id) = parse_id(id) else {
            return Ok(None);
        };
        let query = sqlx::query("UPDATE articles SET title = $1, content = $2 WHERE id = $3")
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(article_id)
            .execute(&self.pool)
            .await;

        match query {
            Ok(done) if done.rows_affected() == 0 => Ok(None),
            Ok(_) => {
                tracing::info!("Updated article {}. new title: {}", id, &draft.title);
                Ok(Some(id.to_string()))
            }
            Err(e) => {
                tracing::error!("Failed to execute query, error: {}", e);
                Err(BackendError::Update("Failed to update article".into()))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, BackendError> {
        tracing::info!("Delete article. id: {}", id);
        let Some(article_id) = parse_id(id) else {
            return Ok(false);
        };

        let delete = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM article_projects WHERE article_id = $1")
                .bind(article_id)
                .execute(&mut *tx)
                .await?;
            let done = sqlx::query("DELETE FROM articles WHERE id = $1")
                .bind(article_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(done.rows_affected() > 0)
        };

        delete.await.map_err(|e| {
            tracing::error!("Failed to execute a query! error: {e}");
            BackendError::Delete("Failed to delete article".into())
        })
    }

    async fn set_status(&self, id: &str, status: ArticleStatus) -> Result<bool, BackendError> {
        let Some(article_id) = parse_id(id) else {
            return Ok(false);
        };
        let query = sqlx::query("UPDATE articles SET status = $1 WHERE id = $2")
            .bind(bool::from(status))
            .bind(article_id)
            .execute(&self.pool)
            .await;

        match query {
            Ok(done) => {
                tracing::info!("Set status of article {} to {:?}", id, status);
                Ok(done.rows_affected() > 0)
            }
            Err(e) => {
                tracing::error!("Failed to execute query, error: {}", e);
                Err(BackendError::Status("Failed to change status".into()))
            }
        }
    }
}
