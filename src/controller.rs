//! List/edit controller: owns the article page, the editor session and the
//! confirmation gate, and wires them to the backend and the UI collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

use crate::backend::{ArticleBackend, ConfirmationDialog, EditingSurface, NotificationSink};
use crate::config::EditorConfig;
use crate::error::{BackendError, EditorError, Result};
use crate::gate::{ConfirmationGate, GateState, GuardedAction};
use crate::model::{ArticleDraft, ArticleStatus, Page};
use crate::session::EditorSession;
use crate::store::{ListStore, SaveResult};
use crate::stream::{SaveDispatch, SaveOutcome, SaveStream, SaveTarget, WriteTicket};

pub const NOTICE: &str = "Notice";
pub const SAVED: &str = "Article saved";
pub const MISSING_FIELDS: &str = "Please enter a title or content";
pub const STATUS_CHANGED: &str = "Status changed";
pub const STATUS_NOTICE: &str = "Status notice";
pub const DELETED: &str = "Article deleted";
pub const DELETE_NOTICE: &str = "Delete notice";

/// Everything the controller needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn ArticleBackend>,
    pub surface: Arc<dyn EditingSurface>,
    pub notifier: Arc<dyn NotificationSink>,
    pub dialog: Arc<dyn ConfirmationDialog>,
}

#[derive(Debug, Default)]
struct EditorState {
    store: ListStore,
    session: EditorSession,
    gate: ConfirmationGate,
}

struct Shared {
    state: Mutex<EditorState>,
    pages: watch::Sender<Page>,
    collaborators: Collaborators,
}

impl Shared {
    /// Publishes the store's page to watchers after a successful reconciliation.
    fn publish(&self, state: &EditorState) {
        self.pages.send_replace(state.store.page().clone());
    }
}

#[async_trait]
impl SaveDispatch for Shared {
    async fn target(&self) -> SaveTarget {
        let state = self.state.lock().await;
        match state.session.article_id() {
            Some(id) => SaveTarget::Update { id: id.to_string() },
            None => SaveTarget::Create {
                revision: state.session.revision(),
            },
        }
    }

    async fn write(
        &self,
        draft: &ArticleDraft,
        target: &SaveTarget,
    ) -> Result<Option<String>, BackendError> {
        let backend = &self.collaborators.backend;
        match target {
            SaveTarget::Create { .. } => backend.create(draft).await,
            SaveTarget::Update { id } => backend.update(draft, id).await,
        }
    }

    async fn settle(
        &self,
        draft: ArticleDraft,
        target: SaveTarget,
        result: Result<Option<String>, BackendError>,
        ticket: &WriteTicket,
    ) -> Option<SaveOutcome> {
        let mut state = self.state.lock().await;
        if !ticket.is_current() {
            tracing::debug!("Save #{} superseded while waiting", ticket.generation());
            return None;
        }

        let id = match result {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => return Some(SaveOutcome::Empty),
            Err(e) => {
                self.collaborators.notifier.error(&EditorError::Backend(e));
                return Some(SaveOutcome::Failed);
            }
        };

        let (result, outcome) = match target {
            SaveTarget::Update { id: article_id } => (
                SaveResult::Updated {
                    id: article_id.clone(),
                    draft,
                },
                SaveOutcome::Updated { id: article_id },
            ),
            SaveTarget::Create { revision } => {
                if state.session.adopt_created(revision, &id) {
                    tracing::debug!("Editor now updates article {}", id);
                }
                (
                    SaveResult::Created {
                        id: id.clone(),
                        draft,
                    },
                    SaveOutcome::Created { id },
                )
            }
        };
        if state.store.apply_save_result(&result) {
            self.publish(&state);
        }
        self.collaborators.notifier.success(SAVED, NOTICE);
        Some(outcome)
    }
}

/// Cheap to clone handle; all clones drive the same state.
#[derive(Clone)]
pub struct ListController {
    shared: Arc<Shared>,
    saves: Arc<SaveStream>,
}

impl ListController {
    /// Starts the save pipeline, so this has to run inside a tokio runtime.
    pub fn new(config: &EditorConfig, collaborators: Collaborators) -> Self {
        let (pages, _) = watch::channel(Page::default());
        let shared = Arc::new(Shared {
            state: Mutex::new(EditorState::default()),
            pages,
            collaborators,
        });
        let saves = SaveStream::spawn(config.save_debounce, shared.clone());

        Self {
            shared,
            saves: Arc::new(saves),
        }
    }

    fn collaborators(&self) -> &Collaborators {
        &self.shared.collaborators
    }

    /// Fetches the configured page and replaces the list wholesale.
    pub async fn refresh(&self) -> Result<()> {
        let page = self.collaborators().backend.list().await?;
        tracing::info!("Read {} of {} articles", page.data.len(), page.count);

        let mut state = self.shared.state.lock().await;
        state.store.replace(page);
        self.shared.publish(&state);
        Ok(())
    }

    pub async fn page(&self) -> Page {
        self.shared.state.lock().await.store.page().clone()
    }

    pub async fn session(&self) -> EditorSession {
        self.shared.state.lock().await.session.clone()
    }

    pub async fn gate_state(&self) -> GateState {
        self.shared.state.lock().await.gate.state()
    }

    /// Receives every new page value.
    pub fn subscribe(&self) -> watch::Receiver<Page> {
        self.shared.pages.subscribe()
    }

    pub fn outcomes(&self) -> broadcast::Receiver<SaveOutcome> {
        self.saves.outcomes()
    }

    /// Opens article `id` from the current page in the editor. Returns
    /// `false` when it is not on the page.
    pub async fn load_for_edit(&self, id: &str) -> bool {
        let mut state = self.shared.state.lock().await;
        let EditorState { store, session, .. } = &mut *state;
        match session.load(store.page(), id) {
            Some(content) => {
                if !content.is_empty() {
                    self.collaborators().surface.set_content(content);
                }
                tracing::debug!("Loaded article {} for editing", id);
                true
            }
            None => false,
        }
    }

    /// Starts a fresh article.
    pub async fn clear(&self) {
        self.collaborators().surface.clear();
        self.shared.state.lock().await.session.clear();
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.shared.state.lock().await.session.title = title.into();
    }

    /// Hands the current title and surface content to the save pipeline.
    pub async fn save(&self) -> Result<()> {
        let content = self.collaborators().surface.content();
        let draft = {
            let mut state = self.shared.state.lock().await;
            state.session.content = content;
            state.session.draft()
        };

        match draft {
            Some(draft) => {
                self.saves.submit(draft);
                Ok(())
            }
            None => {
                self.collaborators().notifier.warning(MISSING_FIELDS, NOTICE);
                Err(EditorError::Validation)
            }
        }
    }

    pub async fn request_delete(&self, id: impl Into<String>) {
        self.request(GuardedAction::Delete { id: id.into() }).await;
    }

    pub async fn request_status_change(&self, id: impl Into<String>, status: ArticleStatus) {
        self.request(GuardedAction::SetStatus {
            id: id.into(),
            status,
        })
        .await;
    }

    async fn request(&self, action: GuardedAction) {
        let prompt = action.prompt();
        if let Some(replaced) = self.shared.state.lock().await.gate.request(action) {
            tracing::debug!("Pending confirmation {:?} replaced", replaced);
        }
        self.collaborators().dialog.show(prompt);
    }

    /// Declines the pending action. Returns `false` if nothing was pending.
    pub async fn cancel(&self) -> bool {
        let cancelled = self.shared.state.lock().await.gate.cancel();
        if cancelled.is_some() {
            self.collaborators().dialog.hide();
        }
        cancelled.is_some()
    }

    /// Runs the pending action. The backend call continues in the returned
    /// task; `None` if nothing was pending.
    pub async fn confirm(&self) -> Option<JoinHandle<()>> {
        let (action, ticket) = self.shared.state.lock().await.gate.confirm()?;
        let shared = self.shared.clone();

        Some(tokio::spawn(async move {
            let collaborators = &shared.collaborators;
            let result = match &action {
                GuardedAction::Delete { id } => collaborators.backend.delete(id).await,
                GuardedAction::SetStatus { id, status } => {
                    collaborators.backend.set_status(id, *status).await
                }
            };

            let mut state = shared.state.lock().await;
            if state.gate.complete(ticket) {
                collaborators.dialog.hide();
            }
            match result {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    collaborators.notifier.error(&EditorError::Backend(e));
                    return;
                }
            }

            let changed = match &action {
                GuardedAction::Delete { id } => {
                    collaborators.notifier.success(DELETED, DELETE_NOTICE);
                    state.store.apply_deletion(id)
                }
                GuardedAction::SetStatus { id, status } => {
                    collaborators.notifier.success(STATUS_CHANGED, STATUS_NOTICE);
                    state.store.apply_status_change(id, *status)
                }
            };
            if changed {
                shared.publish(&state);
            }
        }))
    }
}
