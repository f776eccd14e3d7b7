//! Page context: everything the page side owns for one page load.
//!
//! Holds the observer, the notification queue, the router client and the
//! in-flight request map. Nothing is global; `start`/`stop` bound the
//! lifetime of every task it spawns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::browser::TabId;
use crate::dom::{Document, SelectorError};
use crate::notify::{NotificationQueue, Severity};
use crate::observer::{extract_video_reference, DomObserver, TriggerClick};
use crate::outcome::{self, EXTRACTION_FAILED, PROGRESS_MESSAGE};
use crate::router::{Request, Response, RouterClient, RouterError};
use crate::video_ref::VideoReference;

/// Bookkeeping for one request in flight; used only to report duration.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request_id: u64,
    pub video: VideoReference,
    pub started_at: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum TabIdError {
    #[error("Failed to get current tab ID: {0}")]
    Rejected(String),
    #[error("Failed to get current tab ID: {0}")]
    Router(#[from] RouterError),
}

#[derive(Default)]
struct Tasks {
    click_loop: Option<JoinHandle<()>>,
    in_flight: Vec<JoinHandle<()>>,
}

struct PageInner {
    doc: Document,
    observer: DomObserver,
    notifications: NotificationQueue,
    router: RouterClient,
    pending: Mutex<HashMap<u64, PendingRequest>>,
    next_request: AtomicU64,
    tasks: Mutex<Tasks>,
}

#[derive(Clone)]
pub struct PageContext {
    inner: Arc<PageInner>,
}

impl PageContext {
    pub fn new(doc: Document, router: RouterClient) -> Result<Self, SelectorError> {
        Ok(Self {
            inner: Arc::new(PageInner {
                observer: DomObserver::new(doc.clone())?,
                notifications: NotificationQueue::new(doc.clone()),
                doc,
                router,
                pending: Mutex::new(HashMap::new()),
                next_request: AtomicU64::new(1),
                tasks: Mutex::new(Tasks::default()),
            }),
        })
    }

    /// Starts observing the page and handling trigger clicks.
    pub fn start(&self) {
        self.stop_tasks();
        let (tx, mut rx) = mpsc::unbounded_channel::<TriggerClick>();
        self.inner.observer.start(tx);

        let inner = Arc::clone(&self.inner);
        let click_loop = tokio::spawn(async move {
            while let Some(click) = rx.recv().await {
                let page = Arc::clone(&inner);
                let handle = tokio::spawn(async move { page.handle_trigger(click).await });
                let mut tasks = inner.tasks.lock().unwrap();
                tasks.in_flight.retain(|h| !h.is_finished());
                tasks.in_flight.push(handle);
            }
        });
        self.inner.tasks.lock().unwrap().click_loop = Some(click_loop);
        tracing::info!("page context started");
    }

    /// Tears everything down: observer, click handling, in-flight requests
    /// and notification UI. Idempotent.
    pub fn stop(&self) {
        self.inner.observer.stop();
        self.stop_tasks();
        self.inner.pending.lock().unwrap().clear();
        self.inner.notifications.clear();
    }

    fn stop_tasks(&self) {
        let mut tasks = self.inner.tasks.lock().unwrap();
        if let Some(task) = tasks.click_loop.take() {
            task.abort();
        }
        for task in tasks.in_flight.drain(..) {
            task.abort();
        }
    }

    pub fn document(&self) -> &Document {
        &self.inner.doc
    }

    pub fn observer(&self) -> &DomObserver {
        &self.inner.observer
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }

    pub fn pending(&self) -> Vec<PendingRequest> {
        self.inner.pending.lock().unwrap().values().cloned().collect()
    }
}

impl PageInner {
    async fn handle_trigger(&self, click: TriggerClick) {
        let video = match extract_video_reference(&click.container, click.shape) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}", e);
                self.notifications.enqueue(EXTRACTION_FAILED, Severity::Error);
                return;
            }
        };
        tracing::info!(video = %video, shape = %click.shape, "download requested");

        let tab_id = match self.current_tab_id().await {
            Ok(id) => id,
            Err(TabIdError::Router(e)) => {
                tracing::error!("background unavailable: {}", e);
                let (message, severity) = outcome::describe(&Err(e), Duration::ZERO);
                self.notifications.enqueue(message, severity);
                return;
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.notifications.enqueue(format!("Error: {}", e), Severity::Error);
                return;
            }
        };

        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().unwrap().insert(
            request_id,
            PendingRequest {
                request_id,
                video: video.clone(),
                started_at: Instant::now(),
            },
        );
        let progress = self.notifications.show_progress(PROGRESS_MESSAGE);

        let outcome = self
            .router
            .send(Request::DownloadVideo {
                video_url: video.url(),
                tab_id: Some(tab_id),
            })
            .await;

        let elapsed = self
            .pending
            .lock()
            .unwrap()
            .remove(&request_id)
            .map(|p| p.started_at.elapsed())
            .unwrap_or_default();
        let (message, severity) = outcome::describe(&outcome, elapsed);
        self.notifications.enqueue(message, severity);
        progress.finish();
    }

    async fn current_tab_id(&self) -> Result<TabId, TabIdError> {
        match self.router.send(Request::GetCurrentTabId).await? {
            Response {
                success: true,
                tab_id: Some(id),
                ..
            } => Ok(id),
            r => Err(TabIdError::Rejected(
                r.error.unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}
