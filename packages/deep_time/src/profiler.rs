//! The stack-driven profiler that owns an event tree.

use std::time::Duration;

use crate::collective;
use crate::event::{EventId, EventNode, EventTree};
use crate::group::{CommunicationError, ProcessGroup};
use crate::pal::{Platform, PlatformFacade};
use crate::report::{GroupReport, Report};

/// Hierarchical wall-clock profiler for one process of a distributed job.
///
/// Named [`start`](Self::start)/[`end`](Self::end) markers nest in time into a
/// tree of [`EventNode`]s: starting an event while another is active records it
/// as a child of the active one. At the end of a run the tree is printed
/// locally, or aggregated across a [`ProcessGroup`] into per-event max/min/
/// average statistics.
///
/// The profiler is an ordinary value - construct one and thread it through the
/// code that needs it. It drives a single-process call stack and is not meant
/// for concurrent use from multiple threads; use one profiler per thread or
/// serialize access externally.
///
/// # Examples
///
/// ```
/// use deep_time::Profiler;
///
/// let mut profiler = Profiler::with_name("solver");
///
/// profiler.start("assemble");
/// // ... build the system matrix ...
/// profiler.start("boundary");
/// // ... apply boundary conditions; timed as a child of "assemble" ...
/// profiler.end();
/// profiler.end();
///
/// profiler.print_to_stdout();
/// ```
///
/// Aggregating across a process group (here the trivial single-process group):
///
/// ```
/// use deep_time::{LocalGroup, Profiler};
///
/// # fn main() -> Result<(), deep_time::CommunicationError> {
/// let mut profiler = Profiler::new();
/// profiler.start("exchange");
/// profiler.end();
///
/// // Collective: every member of the group must make this call.
/// profiler.print_group_to_stdout(&LocalGroup)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Profiler {
    name: String,
    tree: EventTree,

    /// The innermost event currently being timed. The enclosing stack is not
    /// stored anywhere; it is implied by the parent links of this node.
    current: Option<EventId>,

    platform: PlatformFacade,
}

impl Profiler {
    /// Creates an unnamed profiler.
    #[must_use]
    pub fn new() -> Self {
        Self::with_name(String::new())
    }

    /// Creates a profiler whose name labels the report headers.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: EventTree::default(),
            current: None,
            platform: PlatformFacade::real(),
        }
    }

    /// Creates a profiler reading time from an injected platform.
    ///
    /// This is used by tests to drive the clock explicitly instead of relying
    /// on real time passing.
    #[cfg(test)]
    pub(crate) fn with_platform(name: impl Into<String>, platform: PlatformFacade) -> Self {
        Self {
            name: name.into(),
            tree: EventTree::default(),
            current: None,
            platform,
        }
    }

    /// The name given at construction; empty for an unnamed profiler.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pre-registers a root-level event without starting it.
    ///
    /// The event appears in reports with zero duration even if never started.
    /// Idempotent: registering an existing event leaves it untouched and in
    /// particular does not reset its duration.
    pub fn add(&mut self, name: &str) {
        self.tree.root_or_insert(name);
    }

    /// Begins timing the event `name`, overwriting any earlier measurement of
    /// it when the matching [`end`](Self::end) arrives.
    ///
    /// If no event is active, `name` is a root event; otherwise it becomes a
    /// child of the active event. Either way it is created on first use and
    /// becomes the active event.
    ///
    /// Starting an event while a root event of the same name is still active
    /// indicates a mismatched start/end pair. Debug builds panic on it;
    /// release builds silently proceed. Callers must not rely on the check -
    /// it exists to catch pairing bugs during development, not to define
    /// behavior.
    pub fn start(&mut self, name: &str) {
        self.start_inner(name, false);
    }

    /// Begins timing the event `name`, adding to its earlier measurements when
    /// the matching [`end`](Self::end) arrives.
    ///
    /// Placement and misuse behavior are the same as [`start`](Self::start).
    /// The accumulation policy is taken from whichever start call ran last, so
    /// mixing the two variants on one event is a caller bug the profiler does
    /// not detect.
    pub fn start_accumulating(&mut self, name: &str) {
        self.start_inner(name, true);
    }

    fn start_inner(&mut self, name: &str, accumulate: bool) {
        // Mismatched start/end defense, compiled out of release builds: a
        // root event still active under this name means an earlier start was
        // never ended before timing began again.
        #[cfg(debug_assertions)]
        if let Some(root) = self.tree.root(name) {
            assert!(
                !self.tree.node(root).is_active(),
                "event '{name}' is already active; start/end calls are mismatched"
            );
        }

        let id = match self.current {
            Some(current) => self.tree.child_or_insert(current, name),
            None => self.tree.root_or_insert(name),
        };

        let now = self.platform.monotonic_now();
        let node = self.tree.node_mut(id);
        node.accumulate = accumulate;
        node.active = true;
        node.start = now;
        self.current = Some(id);
    }

    /// Finishes timing the active event and pops back to its parent.
    ///
    /// The elapsed time since the matching start is added to the event's
    /// duration if it accumulates, otherwise it replaces it. Safe no-op when
    /// no event is active, so code may call `end()` defensively without
    /// tracking whether a matching `start()` ran.
    pub fn end(&mut self) {
        let Some(id) = self.current else {
            return;
        };

        let now = self.platform.monotonic_now();
        let node = self.tree.node_mut(id);
        let elapsed = now.saturating_sub(node.start);
        if node.accumulate {
            node.duration = node.duration.checked_add(elapsed).expect(
                "accumulated duration overflows Duration - this indicates an unrealistic scenario",
            );
        } else {
            node.duration = elapsed;
        }
        node.active = false;
        self.current = node.parent();
    }

    /// Discards the measurements of every direct child of the active event.
    ///
    /// Each child's duration is zeroed and its active flag cleared; the child
    /// nodes themselves stay in the tree. Grandchildren and the active event's
    /// own duration are untouched. This supports iterative code that wants to
    /// drop accumulated per-iteration timings mid-run without tearing down the
    /// tree. Safe no-op when no event is active.
    pub fn reset(&mut self) {
        let Some(id) = self.current else {
            return;
        };

        let children: Vec<EventId> = self.tree.node(id).children().map(|(_, id)| id).collect();
        for child in children {
            let node = self.tree.node_mut(child);
            node.duration = Duration::ZERO;
            node.active = false;
        }
    }

    /// Returns the event `name`, creating it if necessary.
    ///
    /// Lookup order mirrors [`start`](Self::start)'s placement rule: an
    /// existing root event wins; otherwise the event is created as a child of
    /// the active event; with nothing active it is created as a new root.
    /// Never fails - the contract is get-or-create, which is why this takes
    /// `&mut self` even when used as a read accessor.
    pub fn event(&mut self, name: &str) -> EventId {
        if let Some(id) = self.tree.root(name) {
            return id;
        }
        match self.current {
            Some(current) => self.tree.child_or_insert(current, name),
            None => self.tree.root_or_insert(name),
        }
    }

    /// Read access to an event node by id.
    ///
    /// Ids come from [`event`](Self::event) or from navigating
    /// [`EventNode::parent`]/[`EventNode::children`] and stay valid for the
    /// profiler's lifetime.
    #[must_use]
    pub fn node(&self, id: EventId) -> &EventNode {
        self.tree.node(id)
    }

    /// Whether any events have been registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Captures a single-process report of all events observed so far.
    #[must_use]
    pub fn to_report(&self) -> Report {
        Report::from_tree(&self.name, &self.tree)
    }

    /// Prints the single-process report to stdout.
    ///
    /// This is a convenience method equivalent to
    /// `self.to_report().print_to_stdout()`.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - covered via Display on Report.
    pub fn print_to_stdout(&self) {
        self.to_report().print_to_stdout();
    }

    /// Aggregates event durations across `group` and captures the statistics
    /// on the group authority (rank 0).
    ///
    /// Returns `Some` report on rank 0 and `None` on every other rank. This is
    /// a collective, blocking call: every member of the group must call it
    /// (with its own profiler) or the whole group hangs. Ranks may have
    /// recorded entirely different event trees; rank 0's tree dictates the
    /// report structure and a rank that never executed an event contributes
    /// zero duration for it. As a side effect, events this rank was missing
    /// are created locally with zero duration.
    ///
    /// # Errors
    ///
    /// Any failed collective operation aborts the aggregation immediately with
    /// a [`CommunicationError`]; no partial statistics are produced and the
    /// group must be considered unusable afterwards.
    pub fn to_group_report<G: ProcessGroup>(
        &mut self,
        group: &G,
    ) -> Result<Option<GroupReport>, CommunicationError> {
        collective::aggregate(&mut self.tree, &self.name, group)
    }

    /// Aggregates event durations across `group` and prints the statistics on
    /// the group authority (rank 0); other ranks print nothing.
    ///
    /// Collective and blocking, like [`to_group_report`](Self::to_group_report).
    ///
    /// # Errors
    ///
    /// Propagates any [`CommunicationError`] from the aggregation.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - covered via to_group_report.
    pub fn print_group_to_stdout<G: ProcessGroup>(
        &mut self,
        group: &G,
    ) -> Result<(), CommunicationError> {
        if let Some(report) = self.to_group_report(group)? {
            report.print_to_stdout();
        }
        Ok(())
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
