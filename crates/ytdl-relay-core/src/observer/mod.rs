//! DOM observer and injector.
//!
//! Keeps exactly one trigger control on every qualifying entry container for
//! as long as the observer runs. Containers are found through the
//! [`SHAPES`] table; each one is processed once (tracked in a [`WeakSet`]),
//! and any relevant mutation of the document triggers a full re-scan.

mod extract;
mod seen;
mod shape;

pub use extract::{extract_video_reference, ExtractionError};
pub use seen::WeakSet;
pub use shape::{CompiledShape, EntryShape, ShapeDescriptor, SHAPES, WATCH_LINK};

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::dom::{ClickEvent, Document, Element, MutationKind, MutationRecord, Selector, SelectorError};
use crate::notify::{NOTIFICATION_CLASS, QUEUE_CONTAINER_ID};

pub const CONTROL_CLASS: &str = "ytdl-relay-download-btn";
pub const STYLE_ID: &str = "ytdl-relay-styles";
const CONTROL_LABEL: &str = "⬇";
const CONTROL_TITLE: &str = "Download with yt-dlp (sends your YouTube session cookies)";

const STYLES: &str = "\
.ytdl-relay-download-btn { position: absolute; top: 8px; right: 8px; z-index: 1000; \
cursor: pointer; border: none; border-radius: 4px; padding: 6px 10px; color: white; \
background: linear-gradient(135deg, #ff4444, #cc0000); }
.ytdl-relay-notification-queue { position: fixed; top: 20px; right: 20px; z-index: 100000; \
display: flex; flex-direction: column; gap: 10px; pointer-events: none; }
.ytdl-relay-download-btn ~ .ytdl-relay-download-btn { display: none; }";

/// Sent when the user clicks a trigger control.
#[derive(Debug, Clone)]
pub struct TriggerClick {
    pub container: Element,
    pub shape: EntryShape,
}

/// Where controls forward their clicks. Shared with every injected control
/// and read at click time, so a restart rewires existing controls.
type TriggerSlot = Arc<Mutex<Option<mpsc::UnboundedSender<TriggerClick>>>>;

#[derive(Default)]
struct ObserverState {
    task: Option<JoinHandle<()>>,
}

struct ObserverInner {
    doc: Document,
    shapes: Vec<CompiledShape>,
    control: Selector,
    seen: Mutex<WeakSet>,
    triggers: TriggerSlot,
    state: Mutex<ObserverState>,
}

#[derive(Clone)]
pub struct DomObserver {
    inner: Arc<ObserverInner>,
}

impl DomObserver {
    pub fn new(doc: Document) -> Result<Self, SelectorError> {
        Ok(Self {
            inner: Arc::new(ObserverInner {
                doc,
                shapes: CompiledShape::compile_all()?,
                control: Selector::parse(&format!(".{}", CONTROL_CLASS))?,
                seen: Mutex::new(WeakSet::new()),
                triggers: Arc::new(Mutex::new(None)),
                state: Mutex::new(ObserverState::default()),
            }),
        })
    }

    /// Injects styles, scans once, then re-scans on relevant mutations.
    /// Clicks on controls are forwarded to `triggers`. Starting a running
    /// observer restarts it.
    pub fn start(&self, triggers: mpsc::UnboundedSender<TriggerClick>) {
        self.stop_task();
        self.inner.inject_styles();
        let mut records = self.inner.doc.subscribe();
        *self.inner.triggers.lock().unwrap() = Some(triggers);

        let injected = self.inner.scan();
        tracing::debug!(injected, "initial scan");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            while let Some(first) = records.recv().await {
                let mut batch = vec![first];
                while let Ok(r) = records.try_recv() {
                    batch.push(r);
                }
                if batch.iter().any(is_relevant) {
                    let injected = inner.scan();
                    if injected > 0 {
                        tracing::debug!(injected, records = batch.len(), "re-scan");
                    }
                }
            }
        });
        self.inner.state.lock().unwrap().task = Some(task);
    }

    /// One scan over every shape; returns the number of controls injected.
    pub fn scan(&self) -> usize {
        self.inner.scan()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().unwrap().task.is_some()
    }

    pub fn seen_count(&self) -> usize {
        let mut seen = self.inner.seen.lock().unwrap();
        seen.prune();
        seen.len()
    }

    /// Disconnects from the document and removes every injected control.
    /// Safe to call any number of times.
    pub fn stop(&self) {
        self.stop_task();
        *self.inner.triggers.lock().unwrap() = None;
        let controls = self.inner.doc.query_selector_all(&self.inner.control);
        let removed = controls.len();
        for control in controls {
            control.remove();
        }
        if let Some(style) = self.inner.doc.get_element_by_id(STYLE_ID) {
            style.remove();
        }
        self.inner.seen.lock().unwrap().clear();
        if removed > 0 {
            tracing::debug!(removed, "observer stopped");
        }
    }

    fn stop_task(&self) {
        if let Some(task) = self.inner.state.lock().unwrap().task.take() {
            task.abort();
        }
    }
}

impl ObserverInner {
    fn scan(&self) -> usize {
        let mut seen = self.seen.lock().unwrap();
        seen.prune();
        let mut injected = 0;
        for shape in &self.shapes {
            for container in self.doc.query_selector_all(&shape.container) {
                if !seen.insert(&container) {
                    continue;
                }
                if self.inject(&container, shape.shape, &shape.anchor) {
                    injected += 1;
                }
            }
        }
        injected
    }

    fn inject(&self, container: &Element, shape: EntryShape, anchor_sel: &Selector) -> bool {
        for stray in container.query_selector_all(&self.control) {
            stray.remove();
        }
        let anchor = container
            .query_selector(anchor_sel)
            .unwrap_or_else(|| container.clone());
        if anchor.query_selector(&self.control).is_some() {
            return false;
        }

        let button = self.doc.create_element("button");
        button.set_attr("type", "button");
        button.set_attr("class", CONTROL_CLASS);
        button.set_attr("title", CONTROL_TITLE);
        button.set_text(CONTROL_LABEL);

        let triggers = Arc::clone(&self.triggers);
        // Weak: the control lives under the container.
        let target = container.downgrade();
        button.set_click_handler(Arc::new(move |ev: &mut ClickEvent| {
            ev.stop_propagation();
            ev.prevent_default();
            let Some(container) = target.upgrade() else {
                return;
            };
            let Some(tx) = triggers.lock().unwrap().clone() else {
                tracing::debug!("trigger click while observer stopped");
                return;
            };
            if tx.send(TriggerClick { container, shape }).is_err() {
                tracing::debug!("trigger click after page context stopped");
            }
        }));

        anchor.set_style("position", "relative");
        anchor.append_child(&button);
        true
    }

    fn inject_styles(&self) {
        if self.doc.get_element_by_id(STYLE_ID).is_some() {
            return;
        }
        let style = self.doc.create_element("style");
        style.set_attr("id", STYLE_ID);
        style.set_text(STYLES);
        self.doc.head().append_child(&style);
    }
}

/// False only for records that cannot reveal a new container: removals, and
/// insertions made up entirely of our own UI.
fn is_relevant(record: &MutationRecord) -> bool {
    match &record.kind {
        MutationKind::ChildList { added, .. } => added.iter().any(|el| !is_relay_ui(el)),
        MutationKind::Attribute { name } => name != "style" && !is_relay_ui(&record.target),
    }
}

fn is_relay_ui(el: &Element) -> bool {
    el.has_class(CONTROL_CLASS)
        || el.has_class(NOTIFICATION_CLASS)
        || matches!(el.id().as_deref(), Some(STYLE_ID) | Some(QUEUE_CONTAINER_ID))
}
