//! Save intent pipeline: debounce, de-duplicate, dispatch, switch.
//!
//! Raw save requests go in through [`SaveStream::submit`]. A single pipeline
//! task waits for a quiet period, drops drafts equal to the last one that got
//! through, and starts a write for the survivor. Starting a write aborts the
//! one still in flight and bumps a generation counter; a write that finishes
//! under an older generation is dropped before [`SaveDispatch::settle`], and
//! `settle` checks its [`WriteTicket`] again once it holds the list state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::BackendError;
use crate::model::ArticleDraft;

const OUTCOME_CAPACITY: usize = 64;

/// Where a surviving draft gets written, decided when it is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// New article; `revision` is the editor session it was dispatched from.
    Create { revision: u64 },
    Update { id: String },
}

/// Observable result of the newest dispatched write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created { id: String },
    Updated { id: String },
    /// The backend answered without doing anything.
    Empty,
    Failed,
}

/// Identifies one dispatched write against the pipeline's generation counter.
#[derive(Debug, Clone)]
pub struct WriteTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl WriteTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `false` once a newer write has been dispatched.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// The side of the pipeline that talks to the backend and owns list state.
#[async_trait]
pub trait SaveDispatch: Send + Sync + 'static {
    async fn target(&self) -> SaveTarget;

    async fn write(
        &self,
        draft: &ArticleDraft,
        target: &SaveTarget,
    ) -> Result<Option<String>, BackendError>;

    /// Applies the result of the newest write. Must re-check `ticket` while
    /// holding whatever state it mutates and return `None` when stale, so a
    /// superseded write is never shown to the user.
    async fn settle(
        &self,
        draft: ArticleDraft,
        target: SaveTarget,
        result: Result<Option<String>, BackendError>,
        ticket: &WriteTicket,
    ) -> Option<SaveOutcome>;
}

pub struct SaveStream {
    intents: mpsc::UnboundedSender<ArticleDraft>,
    outcomes: broadcast::Sender<SaveOutcome>,
    pipeline: JoinHandle<()>,
}

impl SaveStream {
    /// Starts the pipeline task. Must be called inside a tokio runtime.
    pub fn spawn<D: SaveDispatch>(debounce: Duration, dispatch: Arc<D>) -> Self {
        let (intents, rx) = mpsc::unbounded_channel();
        let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);
        let pipeline = Pipeline {
            debounce,
            dispatch,
            generation: Arc::new(AtomicU64::new(0)),
            last_passed: Arc::new(Mutex::new(None)),
            outcomes: outcomes.clone(),
        };

        Self {
            intents,
            outcomes,
            pipeline: tokio::spawn(pipeline.run(rx)),
        }
    }

    pub fn submit(&self, draft: ArticleDraft) {
        if self.intents.send(draft).is_err() {
            tracing::error!("Save pipeline is gone, dropping save request");
        }
    }

    pub fn outcomes(&self) -> broadcast::Receiver<SaveOutcome> {
        self.outcomes.subscribe()
    }
}

impl Drop for SaveStream {
    fn drop(&mut self) {
        self.pipeline.abort();
    }
}

struct Pipeline<D> {
    debounce: Duration,
    dispatch: Arc<D>,
    generation: Arc<AtomicU64>,
    last_passed: Arc<Mutex<Option<ArticleDraft>>>,
    outcomes: broadcast::Sender<SaveOutcome>,
}

impl<D: SaveDispatch> Pipeline<D> {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<ArticleDraft>) {
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut closed = false;

        while !closed {
            let Some(mut pending) = rx.recv().await else {
                break;
            };
            loop {
                match time::timeout(self.debounce, rx.recv()).await {
                    Ok(Some(next)) => {
                        tracing::debug!("Save request superseded within debounce window");
                        pending = next;
                    }
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            if !self.pass_distinct(&pending) {
                tracing::debug!("Suppressed duplicate save of {:?}", pending.title);
                continue;
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = in_flight.take() {
                previous.abort();
            }
            let target = self.dispatch.target().await;
            tracing::debug!("Dispatching save #{} as {:?}", generation, target);
            in_flight = Some(tokio::spawn(self.write(generation, pending, target)));
        }
    }

    /// Remembers `draft` unless it equals the last draft that got through.
    fn pass_distinct(&self, draft: &ArticleDraft) -> bool {
        let mut last = self.last_passed.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() == Some(draft) {
            return false;
        }
        *last = Some(draft.clone());
        true
    }

    fn write(
        &self,
        generation: u64,
        draft: ArticleDraft,
        target: SaveTarget,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let dispatch = self.dispatch.clone();
        let ticket = WriteTicket {
            generation,
            current: self.generation.clone(),
        };
        let last_passed = self.last_passed.clone();
        let outcomes = self.outcomes.clone();

        async move {
            let result = dispatch.write(&draft, &target).await;
            if !ticket.is_current() {
                tracing::debug!("Discarded stale result of save #{}", generation);
                return;
            }

            if result.is_err() {
                // allow retrying the very same draft
                let mut last = last_passed.lock().unwrap_or_else(PoisonError::into_inner);
                if last.as_ref() == Some(&draft) {
                    *last = None;
                }
            }

            match dispatch.settle(draft, target, result, &ticket).await {
                // nobody listening is fine
                Some(outcome) => {
                    let _ = outcomes.send(outcome);
                }
                None => tracing::debug!("Discarded stale result of save #{}", generation),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    struct Recorder {
        started: Instant,
        writes: Mutex<Vec<(Duration, ArticleDraft)>>,
        delay: Duration,
    }

    impl Recorder {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                started: Instant::now(),
                writes: Mutex::new(Vec::new()),
                delay,
            })
        }

        fn writes(&self) -> Vec<(Duration, ArticleDraft)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SaveDispatch for Recorder {
        async fn target(&self) -> SaveTarget {
            SaveTarget::Create { revision: 0 }
        }

        async fn write(
            &self,
            draft: &ArticleDraft,
            _target: &SaveTarget,
        ) -> Result<Option<String>, BackendError> {
            self.writes
                .lock()
                .unwrap()
                .push((self.started.elapsed(), draft.clone()));
            time::sleep(self.delay).await;
            Ok(Some(draft.title.clone()))
        }

        async fn settle(
            &self,
            _draft: ArticleDraft,
            _target: SaveTarget,
            result: Result<Option<String>, BackendError>,
            ticket: &WriteTicket,
        ) -> Option<SaveOutcome> {
            if !ticket.is_current() {
                return None;
            }
            Some(match result {
                Ok(Some(id)) => SaveOutcome::Created { id },
                Ok(None) => SaveOutcome::Empty,
                Err(_) => SaveOutcome::Failed,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_last_draft() {
        let recorder = Recorder::new(Duration::ZERO);
        let stream = SaveStream::spawn(Duration::from_millis(200), recorder.clone());
        let mut outcomes = stream.outcomes();

        stream.submit(ArticleDraft::new("a", "1"));
        time::sleep(Duration::from_millis(50)).await;
        stream.submit(ArticleDraft::new("a", "2"));
        time::sleep(Duration::from_millis(50)).await;
        stream.submit(ArticleDraft::new("a", "3"));

        assert_eq!(
            outcomes.recv().await.unwrap(),
            SaveOutcome::Created { id: "a".into() }
        );
        let writes = recorder.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, Duration::from_millis(300));
        assert_eq!(writes[0].1, ArticleDraft::new("a", "3"));
    }

    #[tokio::test(start_paused = true)]
    async fn equal_drafts_are_written_once() {
        let recorder = Recorder::new(Duration::ZERO);
        let stream = SaveStream::spawn(Duration::from_millis(200), recorder.clone());

        stream.submit(ArticleDraft::new("t", "c"));
        time::sleep(Duration::from_millis(500)).await;
        stream.submit(ArticleDraft::new("t", "c"));
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(recorder.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_write_hides_older_result() {
        let recorder = Recorder::new(Duration::from_millis(400));
        let stream = SaveStream::spawn(Duration::from_millis(200), recorder.clone());
        let mut outcomes = stream.outcomes();

        stream.submit(ArticleDraft::new("first", "c"));
        time::sleep(Duration::from_millis(300)).await;
        stream.submit(ArticleDraft::new("second", "c"));

        assert_eq!(
            outcomes.recv().await.unwrap(),
            SaveOutcome::Created {
                id: "second".into()
            }
        );
        time::sleep(Duration::from_secs(1)).await;
        assert!(outcomes.try_recv().is_err());
        assert_eq!(recorder.writes().len(), 2);
    }
}
