//! Element handles, tree edits, and click dispatch.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use super::{DocumentInner, MutationKind, MutationRecord, Selector};

pub type NodeId = u64;

/// Click listener attached to an element. Runs during bubbling.
pub type ClickHandler = Arc<dyn Fn(&mut ClickEvent) + Send + Sync>;

/// A click in flight. Handlers may stop bubbling or cancel navigation.
pub struct ClickEvent {
    target: Element,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl ClickEvent {
    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Default)]
struct NodeState {
    parent: Weak<Node>,
    children: Vec<Element>,
    attrs: Vec<(String, String)>,
    text: String,
    click_handler: Option<ClickHandler>,
}

pub(crate) struct Node {
    id: NodeId,
    tag: String,
    doc: Weak<DocumentInner>,
    state: Mutex<NodeState>,
}

/// Shared handle to an element. Equality is identity.
#[derive(Clone)]
pub struct Element(Arc<Node>);

/// Non-owning handle; does not keep the element alive.
#[derive(Clone)]
pub struct WeakElement {
    id: NodeId,
    inner: Weak<Node>,
}

impl WeakElement {
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(Element)
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakElement(#{})", self.id)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.0.tag, self.0.id)
    }
}

impl Element {
    pub(crate) fn new_detached(doc: Weak<DocumentInner>, id: NodeId, tag: &str) -> Self {
        Element(Arc::new(Node {
            id,
            tag: tag.to_ascii_lowercase(),
            doc,
            state: Mutex::new(NodeState::default()),
        }))
    }

    fn notify(&self, kind: MutationKind) {
        if let Some(doc) = self.0.doc.upgrade() {
            doc.notify(MutationRecord {
                target: self.clone(),
                kind,
            });
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.0.id
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            id: self.0.id,
            inner: Arc::downgrade(&self.0),
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let state = self.0.state.lock().unwrap();
        state
            .attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        {
            let mut state = self.0.state.lock().unwrap();
            match state.attrs.iter_mut().find(|(k, _)| *k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => state.attrs.push((name.clone(), value.to_string())),
            }
        }
        self.notify(MutationKind::Attribute { name });
    }

    pub fn remove_attr(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        let removed = {
            let mut state = self.0.state.lock().unwrap();
            let before = state.attrs.len();
            state.attrs.retain(|(k, _)| *k != name);
            before != state.attrs.len()
        };
        if removed {
            self.notify(MutationKind::Attribute { name });
        }
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|x| x == class))
            .unwrap_or(false)
    }

    /// Upserts one declaration in the inline `style` attribute.
    pub fn set_style(&self, property: &str, value: &str) {
        let current = self.attr("style").unwrap_or_default();
        let mut decls: Vec<(String, String)> = current
            .split(';')
            .filter_map(|d| d.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.eq_ignore_ascii_case(property))
            .collect();
        decls.push((property.to_string(), value.to_string()));
        let style = decls
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attr("style", &style);
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.attr("style")?
            .split(';')
            .filter_map(|d| d.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(property))
            .map(|(_, v)| v.trim().to_string())
    }

    pub fn text(&self) -> String {
        self.0.state.lock().unwrap().text.clone()
    }

    pub fn set_text(&self, text: &str) {
        self.0.state.lock().unwrap().text = text.to_string();
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.state.lock().unwrap().parent.upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.state.lock().unwrap().children.clone()
    }

    /// Ancestors from the parent up to the document root.
    pub fn ancestors(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut cur = self.parent();
        while let Some(el) = cur {
            cur = el.parent();
            out.push(el);
        }
        out
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<Element> = self.children().into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            stack.extend(el.children().into_iter().rev());
            out.push(el);
        }
        out
    }

    pub fn is_connected(&self) -> bool {
        let Some(doc) = self.0.doc.upgrade() else {
            return false;
        };
        *self == doc.root || self.ancestors().last() == Some(&doc.root)
    }

    /// Appends `child`, detaching it from its previous parent first.
    /// Refused when `child` is `self` or one of its ancestors, since the
    /// tree would become a cycle.
    pub fn append_child(&self, child: &Element) {
        if child == self || self.ancestors().contains(child) {
            tracing::warn!(
                parent = %self.tag(),
                child = %child.tag(),
                "refusing to append an element into its own subtree"
            );
            return;
        }
        child.remove();
        child.0.state.lock().unwrap().parent = Arc::downgrade(&self.0);
        self.0.state.lock().unwrap().children.push(child.clone());
        self.notify(MutationKind::ChildList {
            added: vec![child.clone()],
            removed: Vec::new(),
        });
    }

    /// Detaches this element from its parent. No-op when already detached.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        child_unlink(&parent, self);
        self.0.state.lock().unwrap().parent = Weak::new();
        parent.notify(MutationKind::ChildList {
            added: Vec::new(),
            removed: vec![self.downgrade()],
        });
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<Element> {
        self.descendants().into_iter().find(|e| selector.matches(e))
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|e| selector.matches(e))
            .collect()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, selector: &Selector) -> Option<Element> {
        if selector.matches(self) {
            return Some(self.clone());
        }
        self.ancestors().into_iter().find(|e| selector.matches(e))
    }

    pub fn set_click_handler(&self, handler: ClickHandler) {
        self.0.state.lock().unwrap().click_handler = Some(handler);
    }

    fn click_handler(&self) -> Option<ClickHandler> {
        self.0.state.lock().unwrap().click_handler.clone()
    }

    /// Dispatches a click: target handler first, then ancestors, then the
    /// default action (anchor navigation) unless a handler prevented it.
    pub fn click(&self) -> ClickEvent {
        let mut ev = ClickEvent {
            target: self.clone(),
            propagation_stopped: false,
            default_prevented: false,
        };
        let mut path = vec![self.clone()];
        path.extend(self.ancestors());
        for el in path {
            if let Some(handler) = el.click_handler() {
                handler(&mut ev);
            }
            if ev.propagation_stopped {
                break;
            }
        }
        if !ev.default_prevented {
            let anchor = std::iter::once(self.clone())
                .chain(self.ancestors())
                .find(|e| e.tag() == "a" && e.attr("href").is_some());
            if let (Some(a), Some(doc)) = (anchor, self.0.doc.upgrade()) {
                if let Some(href) = a.attr("href") {
                    doc.record_navigation(href);
                }
            }
        }
        ev
    }
}

fn child_unlink(parent: &Element, child: &Element) {
    parent
        .0
        .state
        .lock()
        .unwrap()
        .children
        .retain(|c| c != child);
}
