//! Editing and listing controller for blog articles.
//!
//! Lists articles page by page, edits one article at a time and persists
//! saves through a debounced, de-duplicated pipeline. Single-item results
//! (create, update, delete, status change) are reconciled into the in-memory
//! page instead of refetching the list.
//!
//! ## Environment variables:
//! * DATABASE_URL - sqlite://articles.db
//! * SAVE_DEBOUNCE_MS - quiet period before a save is written, 200 by default
//! * ARTICLES_PAGE / ARTICLES_PER_PAGE - which page the list shows

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod model;
pub mod session;
pub mod store;
pub mod stream;
pub mod terminal;

pub use backend::{ArticleBackend, ConfirmationDialog, EditingSurface, NotificationSink, SqliteBackend};
pub use config::EditorConfig;
pub use controller::{Collaborators, ListController};
pub use error::{BackendError, EditorError};
pub use model::{Article, ArticleDraft, ArticleStatus, Page, ProjectRef};
pub use stream::SaveOutcome;
