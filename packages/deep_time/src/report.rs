//! Snapshot report types produced by the profiler.
//!
//! Reports decouple "what was measured" from "how it is printed": tests and
//! tooling read the rows programmatically while `Display` renders the
//! human-readable console layout. The output is line-oriented and meant for
//! people, not parsers; no schema is guaranteed.

use std::fmt;
use std::time::Duration;

use crate::event::{EventId, EventTree};

/// Width of the `Event '<name>' took` label column.
const LABEL_WIDTH: usize = 45;

/// Width of each statistics column in a group report.
const STAT_WIDTH: usize = 13;

const SEPARATOR: &str = "=====================";

/// Spaces of indentation per nesting level.
fn indent(depth: usize) -> String {
    " ".repeat(depth.saturating_mul(2))
}

/// Single-process timing report.
///
/// One row per event, depth-first, siblings in ascending name order. Obtained
/// from [`Profiler::to_report`](crate::Profiler::to_report).
///
/// # Examples
///
/// ```
/// use deep_time::Profiler;
///
/// let mut profiler = Profiler::new();
/// profiler.start("solve");
/// profiler.end();
///
/// let report = profiler.to_report();
/// for row in report.rows() {
///     println!("{} at depth {}: {:?}", row.name(), row.depth(), row.duration());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    profiler_name: String,
    rows: Vec<ReportRow>,
}

/// One event in a [`Report`].
#[derive(Clone, Debug)]
pub struct ReportRow {
    name: String,
    depth: usize,
    duration: Duration,
}

impl ReportRow {
    /// The event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth; root events are at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The event's accumulated or last-measured duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Report {
    pub(crate) fn from_tree(profiler_name: &str, tree: &EventTree) -> Self {
        let mut rows = Vec::new();
        for (name, id) in tree.roots() {
            collect_rows(tree, name, id, 0, &mut rows);
        }

        Self {
            profiler_name: profiler_name.to_owned(),
            rows,
        }
    }

    /// Iterates over the rows in display order (depth-first, siblings by name).
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter()
    }

    /// Whether the report contains no events at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prints the report to stdout.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - covered via Display.
    pub fn print_to_stdout(&self) {
        print!("{self}");
    }
}

fn collect_rows(
    tree: &EventTree,
    name: &str,
    id: EventId,
    depth: usize,
    rows: &mut Vec<ReportRow>,
) {
    let node = tree.node(id);
    rows.push(ReportRow {
        name: name.to_owned(),
        depth,
        duration: node.duration(),
    });

    for (child_name, child_id) in node.children() {
        collect_rows(
            tree,
            child_name,
            child_id,
            depth.saturating_add(1),
            rows,
        );
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", header_label(&self.profiler_name))?;
        for row in &self.rows {
            let label = format!("{}Event '{}' took ", indent(row.depth), row.name);
            writeln!(f, "{label:<LABEL_WIDTH$}{:.7} s.", row.duration.as_secs_f64())?;
        }
        writeln!(f, "{SEPARATOR}")
    }
}

/// Cross-process timing report, produced on the group authority (rank 0).
///
/// One row per event with the maximum, minimum and average duration across all
/// ranks of the group. A rank that never executed an event contributes zero
/// for it, so the minimum of any event not executed by every rank is zero;
/// absence means "this rank did not run the region", not "missing data".
#[derive(Clone, Debug)]
pub struct GroupReport {
    profiler_name: String,
    group_size: usize,
    rows: Vec<GroupReportRow>,
}

/// One event in a [`GroupReport`].
#[derive(Clone, Debug)]
pub struct GroupReportRow {
    name: String,
    depth: usize,
    max: Duration,
    min: Duration,
    mean: Duration,
}

impl GroupReportRow {
    /// The event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth; root events are at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The largest duration any rank recorded for this event.
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// The smallest duration any rank recorded for this event.
    ///
    /// Zero whenever at least one rank never executed the event.
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    /// The duration averaged over every rank in the group, ranks that never
    /// executed the event counting as zero.
    #[must_use]
    pub fn mean(&self) -> Duration {
        self.mean
    }
}

impl GroupReport {
    pub(crate) fn new(profiler_name: &str, group_size: usize) -> Self {
        Self {
            profiler_name: profiler_name.to_owned(),
            group_size,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(
        &mut self,
        name: &str,
        depth: usize,
        max: Duration,
        min: Duration,
        mean: Duration,
    ) {
        self.rows.push(GroupReportRow {
            name: name.to_owned(),
            depth,
            max,
            min,
            mean,
        });
    }

    /// The size of the group the statistics were aggregated over.
    #[must_use]
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Iterates over the rows in display order (depth-first, siblings by name).
    pub fn rows(&self) -> impl Iterator<Item = &GroupReportRow> {
        self.rows.iter()
    }

    /// Whether the report contains no events at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prints the report to stdout.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - covered via Display.
    pub fn print_to_stdout(&self) {
        print!("{self}");
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = header_label(&self.profiler_name);
        writeln!(
            f,
            "{header:<43}{:>STAT_WIDTH$}{:>STAT_WIDTH$}{:>STAT_WIDTH$}",
            "max", "min", "avg"
        )?;
        for row in &self.rows {
            let label = format!("{}Event '{}' took", indent(row.depth), row.name);
            writeln!(
                f,
                "{label:<LABEL_WIDTH$}{:>STAT_WIDTH$.6} {:>STAT_WIDTH$.6} {:>STAT_WIDTH$.6} s.",
                row.max.as_secs_f64(),
                row.min.as_secs_f64(),
                row.mean.as_secs_f64()
            )?;
        }
        writeln!(f, "{SEPARATOR}")
    }
}

fn header_label(profiler_name: &str) -> String {
    if profiler_name.is_empty() {
        "timing:".to_owned()
    } else {
        format!("{profiler_name} timing:")
    }
}
