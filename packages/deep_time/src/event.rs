//! The owned tree of named timing events.
//!
//! This is a pure in-process data model: nodes are owned by an arena inside
//! [`EventTree`], parents refer to children (and children back to parents) via
//! [`EventId`] indexes. Nodes are never removed or moved between parents, so an
//! id stays valid for the lifetime of the tree that issued it.

use std::collections::BTreeMap;
use std::time::Duration;

/// Opaque handle to an event node within one [`Profiler`](crate::Profiler).
///
/// Ids are only meaningful for the profiler that issued them and remain valid
/// for its whole lifetime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EventId(pub(crate) usize);

/// One named, possibly repeated timed region of code.
///
/// A node records the accumulated (or last-measured) wall-clock duration of the
/// region, whether a measurement is currently in flight and where the node sits
/// in the nesting hierarchy. Nodes are created by the profiler, either
/// explicitly via [`Profiler::add`](crate::Profiler::add) or implicitly on the
/// first [`start`](crate::Profiler::start) under a given name at a given
/// nesting position.
#[derive(Debug)]
pub struct EventNode {
    name: String,

    /// Timestamp captured at the most recent start. Transient; only meaningful
    /// while `active` is set.
    pub(crate) start: Duration,

    pub(crate) duration: Duration,
    pub(crate) active: bool,

    /// Whether successive start/end cycles add to `duration` (true) or
    /// overwrite it (false). Set anew on every start; the last start wins.
    pub(crate) accumulate: bool,

    parent: Option<EventId>,
    children: BTreeMap<String, EventId>,
}

impl EventNode {
    fn new(name: String, parent: Option<EventId>) -> Self {
        Self {
            name,
            start: Duration::ZERO,
            duration: Duration::ZERO,
            active: false,
            accumulate: false,
            parent,
            children: BTreeMap::new(),
        }
    }

    /// The name of this event, unique among its siblings but not globally.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accumulated or last-measured elapsed wall-clock time.
    ///
    /// Persists after [`end`](crate::Profiler::end); zero for a node that was
    /// registered but never timed.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a measurement is currently in flight for this node.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether repeated start/end cycles sum their durations instead of the
    /// last cycle overwriting earlier ones.
    #[must_use]
    pub fn accumulates(&self) -> bool {
        self.accumulate
    }

    /// The enclosing event, or `None` for a root event.
    #[must_use]
    pub fn parent(&self) -> Option<EventId> {
        self.parent
    }

    /// Looks up a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<EventId> {
        self.children.get(name).copied()
    }

    /// Iterates over the direct children in ascending name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, EventId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// The number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Arena-owned tree of event nodes with named roots.
///
/// Roots and children are kept in ordered maps so that every traversal visits
/// siblings in ascending name order. The collective aggregation protocol relies
/// on that order being deterministic.
#[derive(Debug, Default)]
pub(crate) struct EventTree {
    nodes: Vec<EventNode>,
    roots: BTreeMap<String, EventId>,
}

impl EventTree {
    pub(crate) fn node(&self, id: EventId) -> &EventNode {
        self.nodes
            .get(id.0)
            .expect("event ids are never invalidated while their tree is alive")
    }

    pub(crate) fn node_mut(&mut self, id: EventId) -> &mut EventNode {
        self.nodes
            .get_mut(id.0)
            .expect("event ids are never invalidated while their tree is alive")
    }

    pub(crate) fn root(&self, name: &str) -> Option<EventId> {
        self.roots.get(name).copied()
    }

    /// Iterates over the root events in ascending name order.
    pub(crate) fn roots(&self) -> impl Iterator<Item = (&str, EventId)> {
        self.roots.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub(crate) fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the root event `name`, creating an idle zero-duration node if
    /// it does not exist yet. Idempotent.
    pub(crate) fn root_or_insert(&mut self, name: &str) -> EventId {
        if let Some(id) = self.roots.get(name) {
            return *id;
        }

        let id = self.push(EventNode::new(name.to_owned(), None));
        self.roots.insert(name.to_owned(), id);
        id
    }

    /// Returns the child `name` of `parent`, creating an idle zero-duration
    /// node if it does not exist yet. Idempotent.
    pub(crate) fn child_or_insert(&mut self, parent: EventId, name: &str) -> EventId {
        if let Some(id) = self.node(parent).child(name) {
            return id;
        }

        let id = self.push(EventNode::new(name.to_owned(), Some(parent)));
        self.node_mut(parent).children.insert(name.to_owned(), id);
        id
    }

    fn push(&mut self, node: EventNode) -> EventId {
        let id = EventId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}
