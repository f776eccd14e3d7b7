//! Request/reply bridge between the page side and the background side.
//!
//! The page holds a [`RouterClient`]; the background runs a loop that owns
//! the coordinator and the browser host. Each request travels in an
//! [`Envelope`] with a correlation id and a oneshot reply channel, is handled
//! on its own task, and gets exactly one reply. Delivery failures surface as
//! [`RouterError`], never as a failed [`Response`].

mod protocol;

pub use protocol::{Request, Response};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::browser::{BrowserHost, TabId};
use crate::coordinator::{DownloadCoordinator, ErrorKind};
use crate::video_ref::VideoReference;

const CHANNEL_CAPACITY: usize = 64;

pub struct Envelope {
    pub id: u64,
    /// Tab the request came from, if it came from a page.
    pub sender_tab: Option<TabId>,
    pub request: Request,
    reply: oneshot::Sender<Response>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("background service is not running")]
    Disconnected,
    #[error("request {0} was dropped without a reply")]
    NoReply(u64),
}

/// Background side: answers requests using the coordinator and browser host.
pub struct Background {
    coordinator: Arc<DownloadCoordinator>,
    host: Arc<dyn BrowserHost>,
}

impl Background {
    pub fn new(coordinator: Arc<DownloadCoordinator>, host: Arc<dyn BrowserHost>) -> Self {
        Self { coordinator, host }
    }

    /// Starts the request loop. It runs until every client is dropped.
    pub fn spawn(self) -> (RouterClient, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);
        let background = Arc::new(self);
        let handle = tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let background = Arc::clone(&background);
                tokio::spawn(async move {
                    let Envelope {
                        id,
                        sender_tab,
                        request,
                        reply,
                    } = envelope;
                    tracing::debug!(id, action = request.action(), "request received");
                    let response = background.handle(request, sender_tab).await;
                    if reply.send(response).is_err() {
                        tracing::debug!(id, "requester went away before the reply");
                    }
                });
            }
            tracing::debug!("router closed");
        });
        (RouterClient::new(tx), handle)
    }

    pub async fn handle(&self, request: Request, sender_tab: Option<TabId>) -> Response {
        match request {
            Request::DownloadVideo { video_url, tab_id } => {
                let Some(tab_id) = tab_id.or(sender_tab) else {
                    return Response::failure("no tab to take cookies from", ErrorKind::InvalidRequest);
                };
                let Some(video) = VideoReference::from_watch_href(&video_url) else {
                    return Response::failure(
                        format!("not a video URL: {}", video_url),
                        ErrorKind::InvalidRequest,
                    );
                };
                match self.coordinator.submit_download(&video, tab_id).await {
                    Ok(result) => Response::with_result(result),
                    Err(e) => e.into(),
                }
            }
            Request::CheckServer => Response {
                success: self.coordinator.check_server_health().await,
                ..Response::default()
            },
            Request::GetCookies { tab_id } => {
                let Some(tab_id) = tab_id.or(sender_tab) else {
                    return Response::failure("no tab to take cookies from", ErrorKind::InvalidRequest);
                };
                match self.coordinator.cookies().collect(tab_id).await {
                    Ok(bundle) => Response::with_cookies(bundle),
                    Err(e) => Response::failure(e.to_string(), ErrorKind::Cookies),
                }
            }
            Request::GetCurrentTabId => match self.host.active_tab().await {
                Some(tab) => Response::with_tab_id(tab.id),
                None => Response::failure("No active tab found", ErrorKind::NoActiveTab),
            },
        }
    }
}

/// Page-side handle. Cheap to clone; clones share the id counter.
#[derive(Clone)]
pub struct RouterClient {
    tx: mpsc::Sender<Envelope>,
    next_id: Arc<AtomicU64>,
    sender_tab: Option<TabId>,
}

impl RouterClient {
    fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            sender_tab: None,
        }
    }

    /// A client whose requests are marked as coming from `tab`.
    pub fn with_sender(&self, tab: TabId) -> Self {
        Self {
            sender_tab: Some(tab),
            ..self.clone()
        }
    }

    pub fn sender_tab(&self) -> Option<TabId> {
        self.sender_tab
    }

    /// Sends one request and waits for its single reply.
    pub async fn send(&self, request: Request) -> Result<Response, RouterError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                id,
                sender_tab: self.sender_tab,
                request,
                reply,
            })
            .await
            .map_err(|_| RouterError::Disconnected)?;
        rx.await.map_err(|_| RouterError::NoReply(id))
    }
}
