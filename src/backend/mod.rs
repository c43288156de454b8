//! Collaborators the editor talks to. The controller only sees these traits.

use async_trait::async_trait;

use crate::error::{BackendError, EditorError};
use crate::model::{ArticleDraft, ArticleStatus, Page};

mod sqlite;

pub use sqlite::SqliteBackend;

/// Article persistence. Every call is single-shot: one result or one failure.
///
/// `Ok(None)` / `Ok(false)` mean the backend completed but did nothing,
/// e.g. the id was unknown.
#[async_trait]
pub trait ArticleBackend: Send + Sync {
    async fn list(&self) -> Result<Page, BackendError>;
    async fn create(&self, draft: &ArticleDraft) -> Result<Option<String>, BackendError>;
    async fn update(&self, draft: &ArticleDraft, id: &str)
        -> Result<Option<String>, BackendError>;
    async fn delete(&self, id: &str) -> Result<bool, BackendError>;
    async fn set_status(&self, id: &str, status: ArticleStatus) -> Result<bool, BackendError>;
}

/// Rich-text editing widget holding the article body.
pub trait EditingSurface: Send + Sync {
    fn content(&self) -> String;
    fn set_content(&self, content: &str);
    fn clear(&self);
}

/// Fire-and-forget user notifications.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str, title: &str);
    fn warning(&self, message: &str, title: &str);

    /// Generic error surface for failures the editor does not recover from.
    fn error(&self, err: &EditorError) {
        tracing::error!("{}", err);
    }
}

/// The one shared yes/no dialog.
pub trait ConfirmationDialog: Send + Sync {
    fn show(&self, prompt: &str);
    fn hide(&self);
}
