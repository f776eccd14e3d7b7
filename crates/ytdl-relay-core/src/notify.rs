//! On-page status notifications.
//!
//! Terminal outcomes go through a FIFO and are shown one at a time: each
//! notification moves `Queued → Visible → Dismissing → Removed`, and the next
//! one becomes visible only after the full display interval. Progress
//! notifications bypass the queue entirely and are dismissed on their own
//! timer, so they never block or get blocked by queued outcomes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::dom::{Document, Element};

/// Time from one queued notification becoming visible to the next.
pub const DISPLAY_INTERVAL: Duration = Duration::from_millis(3000);
/// How long a notification stays fully visible before it starts dismissing.
pub const VISIBLE_FOR: Duration = Duration::from_millis(2500);
/// Length of the dismiss animation.
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(300);
/// How long a progress notification lingers after its request finished.
pub const PROGRESS_LINGER: Duration = Duration::from_millis(2000);

pub const QUEUE_CONTAINER_ID: &str = "ytdl-relay-notification-queue";
pub const NOTIFICATION_CLASS: &str = "ytdl-relay-notification";
pub const PROGRESS_CLASS: &str = "ytdl-relay-progress-notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    fn colors(self) -> (&'static str, &'static str) {
        match self {
            Severity::Info => ("#2196F3", "#1976D2"),
            Severity::Success => ("#4CAF50", "#45a049"),
            Severity::Error => ("#ff4444", "#cc0000"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Queued,
    Visible,
    Dismissing,
    Removed,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub enqueued_at: Instant,
}

/// One lifecycle transition, broadcast to subscribers.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub id: u64,
    pub state: NotificationState,
    pub severity: Severity,
    pub message: String,
    /// True for progress notifications (outside the FIFO).
    pub progress: bool,
    pub at: Instant,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Notification>,
    displaying: bool,
    display_task: Option<JoinHandle<()>>,
}

struct QueueInner {
    doc: Document,
    state: Mutex<QueueState>,
    events: broadcast::Sender<NotificationEvent>,
    next_id: AtomicU64,
}

/// Per-page notification queue. Clones share the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

impl NotificationQueue {
    pub fn new(doc: Document) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(QueueInner {
                doc,
                state: Mutex::new(QueueState::default()),
                events,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Appends to the FIFO and starts the display loop if idle.
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let n = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            severity,
            enqueued_at: Instant::now(),
        };
        let id = n.id;
        self.inner.emit(&n, NotificationState::Queued, false);

        let mut state = self.inner.state.lock().unwrap();
        state.pending.push_back(n);
        if !state.displaying {
            state.displaying = true;
            let inner = Arc::clone(&self.inner);
            state.display_task = Some(tokio::spawn(run_display_loop(inner)));
        }
        id
    }

    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().unwrap().pending.len()
    }

    pub fn is_displaying(&self) -> bool {
        self.inner.state.lock().unwrap().displaying
    }

    /// Shows a progress notification immediately, outside the FIFO.
    pub fn show_progress(&self, message: impl Into<String>) -> ProgressHandle {
        let n = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            severity: Severity::Info,
            enqueued_at: Instant::now(),
        };
        let element = self.inner.render(&n, true);
        self.inner.emit(&n, NotificationState::Visible, true);
        ProgressHandle {
            inner: Arc::clone(&self.inner),
            notification: n,
            element: Some(element),
        }
    }

    /// Drops pending notifications, stops the display loop and removes all
    /// notification UI. Safe to call repeatedly.
    pub fn clear(&self) {
        let task = {
            let mut state = self.inner.state.lock().unwrap();
            state.pending.clear();
            state.displaying = false;
            state.display_task.take()
        };
        if let Some(task) = task {
            task.abort();
        }
        if let Some(container) = self.inner.doc.get_element_by_id(QUEUE_CONTAINER_ID) {
            container.remove();
        }
    }
}

impl QueueInner {
    fn emit(&self, n: &Notification, state: NotificationState, progress: bool) {
        // No subscribers is fine.
        let _ = self.events.send(NotificationEvent {
            id: n.id,
            state,
            severity: n.severity,
            message: n.message.clone(),
            progress,
            at: Instant::now(),
        });
    }

    fn container(&self) -> Element {
        if let Some(c) = self.doc.get_element_by_id(QUEUE_CONTAINER_ID) {
            return c;
        }
        let c = self.doc.create_element("div");
        c.set_attr("id", QUEUE_CONTAINER_ID);
        c.set_attr("class", QUEUE_CONTAINER_ID);
        self.doc.body().append_child(&c);
        c
    }

    fn render(&self, n: &Notification, progress: bool) -> Element {
        let el = self.doc.create_element("div");
        let class = if progress {
            format!("{NOTIFICATION_CLASS} {PROGRESS_CLASS}")
        } else {
            NOTIFICATION_CLASS.to_string()
        };
        el.set_attr("class", &class);
        el.set_text(&n.message);
        let (background, border) = n.severity.colors();
        el.set_style("background", background);
        el.set_style("border-color", border);
        self.container().append_child(&el);
        el
    }

    fn unrender(&self, el: &Element) {
        let container = el.parent();
        el.remove();
        if let Some(c) = container {
            if c.children().is_empty() {
                c.remove();
            }
        }
    }
}

async fn run_display_loop(inner: Arc<QueueInner>) {
    loop {
        let next = {
            let mut state = inner.state.lock().unwrap();
            match state.pending.pop_front() {
                Some(n) => n,
                None => {
                    state.displaying = false;
                    state.display_task = None;
                    return;
                }
            }
        };
        tracing::debug!(id = next.id, severity = ?next.severity, "notification: {}", next.message);
        let el = inner.render(&next, false);
        inner.emit(&next, NotificationState::Visible, false);
        tokio::time::sleep(VISIBLE_FOR).await;

        inner.emit(&next, NotificationState::Dismissing, false);
        tokio::time::sleep(DISMISS_ANIMATION).await;

        inner.unrender(&el);
        inner.emit(&next, NotificationState::Removed, false);
        tokio::time::sleep(DISPLAY_INTERVAL - VISIBLE_FOR - DISMISS_ANIMATION).await;
    }
}

/// A visible progress notification. Dismissed `PROGRESS_LINGER` after
/// [`ProgressHandle::finish`], or after being dropped.
pub struct ProgressHandle {
    inner: Arc<QueueInner>,
    notification: Notification,
    element: Option<Element>,
}

impl ProgressHandle {
    pub fn id(&self) -> u64 {
        self.notification.id
    }

    pub fn finish(mut self) {
        self.schedule_dismiss();
    }

    fn schedule_dismiss(&mut self) {
        let Some(el) = self.element.take() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        let n = self.notification.clone();
        let dismiss = async move {
            tokio::time::sleep(PROGRESS_LINGER).await;
            inner.unrender(&el);
            inner.emit(&n, NotificationState::Removed, true);
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(dismiss);
            }
            Err(_) => tracing::debug!("no runtime; progress notification left in place"),
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.schedule_dismiss();
    }
}
