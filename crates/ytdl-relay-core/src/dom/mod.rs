//! In-memory page document: element tree, mutation records, click dispatch.
//!
//! Elements are shared handles (`Arc`) with weak parent links, so a subtree
//! lives exactly as long as something (its parent, or a caller) holds it.
//! Every structural or attribute change is delivered as a [`MutationRecord`]
//! to each live subscriber of the owning [`Document`].

mod element;
mod selector;

pub use element::{ClickEvent, ClickHandler, Element, NodeId, WeakElement};
pub use selector::{Selector, SelectorError};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

/// What changed in a single mutation.
#[derive(Debug, Clone)]
pub enum MutationKind {
    /// Children were inserted under or removed from `target`.
    ChildList {
        added: Vec<Element>,
        removed: Vec<WeakElement>,
    },
    /// An attribute of `target` changed (set or removed).
    Attribute { name: String },
}

#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: Element,
    pub kind: MutationKind,
}

pub(crate) struct DocumentInner {
    next_id: AtomicU64,
    root: Element,
    head: Element,
    body: Element,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<MutationRecord>>>,
    navigations: Mutex<Vec<String>>,
}

impl DocumentInner {
    pub(crate) fn allocate_id(&self) -> NodeId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn notify(&self, record: MutationRecord) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.retain(|tx| tx.send(record.clone()).is_ok());
    }

    pub(crate) fn record_navigation(&self, href: String) {
        tracing::debug!(%href, "navigation");
        self.navigations.lock().unwrap().push(href);
    }
}

/// The page document. Cheap to clone; clones share the same tree.
#[derive(Clone)]
pub struct Document(Arc<DocumentInner>);

impl Document {
    pub fn new() -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<DocumentInner>| {
            let root = Element::new_detached(weak.clone(), 0, "html");
            let head = Element::new_detached(weak.clone(), 1, "head");
            let body = Element::new_detached(weak.clone(), 2, "body");
            // The document cannot be upgraded yet, so these links emit no records.
            root.append_child(&head);
            root.append_child(&body);
            DocumentInner {
                next_id: AtomicU64::new(3),
                root,
                head,
                body,
                subscribers: Mutex::new(Vec::new()),
                navigations: Mutex::new(Vec::new()),
            }
        });
        Self(inner)
    }

    pub fn create_element(&self, tag: &str) -> Element {
        let id = self.0.allocate_id();
        Element::new_detached(Arc::downgrade(&self.0), id, tag)
    }

    pub fn root(&self) -> Element {
        self.0.root.clone()
    }

    pub fn head(&self) -> Element {
        self.0.head.clone()
    }

    pub fn body(&self) -> Element {
        self.0.body.clone()
    }

    /// Registers a subtree-wide observer. Dropping the receiver disconnects it.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<MutationRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.0.subscribers.lock().unwrap().push(tx);
        rx
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<Element> {
        self.0.root.query_selector(selector)
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Element> {
        self.0.root.query_selector_all(selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.0
            .root
            .descendants()
            .into_iter()
            .find(|e| e.id().as_deref() == Some(id))
    }

    /// Hrefs navigated to by unprevented anchor clicks, oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.0.navigations.lock().unwrap().clone()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
