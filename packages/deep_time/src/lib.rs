//! Hierarchical wall-clock time tracking for distributed numerical jobs.
//!
//! This package provides a profiler for jobs whose work is spread across many
//! cooperating processes. Each process marks named regions of its computation
//! with start/end calls; regions nested in time become nested in a reporting
//! tree; at the end of the run every process's tree is aggregated across a
//! process group into per-event max/min/average wall-clock statistics.
//!
//! The core types:
//! - [`Profiler`] - drives the event tree via start/end/reset calls and
//!   produces reports
//! - [`EventNode`] / [`EventId`] - the named timing nodes and their handles
//! - [`Report`] / [`GroupReport`] - printable snapshots, single-process and
//!   group-aggregated
//! - [`ProcessGroup`] - the collective communication capability the group
//!   report consumes; [`LocalGroup`] is the trivial single-process group
//!
//! # Simple usage
//!
//! ```
//! use deep_time::Profiler;
//!
//! let mut profiler = Profiler::with_name("solver");
//!
//! profiler.start("assemble");
//! // ... assemble the system ...
//! profiler.end();
//!
//! for _ in 0..3 {
//!     // Accumulating events sum repeated measurements instead of keeping
//!     // only the last one.
//!     profiler.start_accumulating("iterate");
//!     // ... one solver iteration ...
//!     profiler.end();
//! }
//!
//! profiler.print_to_stdout();
//! ```
//!
//! # Nesting
//!
//! Starting an event while another is active records it as a child:
//!
//! ```
//! use deep_time::Profiler;
//!
//! let mut profiler = Profiler::new();
//!
//! profiler.start("outer");
//! profiler.start("inner"); // child of "outer"
//! profiler.end(); // ends "inner"
//! profiler.end(); // ends "outer"
//!
//! let outer = profiler.event("outer");
//! assert!(profiler.node(outer).child("inner").is_some());
//! ```
//!
//! # Aggregating across a process group
//!
//! Group reporting is collective: every member of the group must call it, and
//! the call blocks until all do. Rank 0 drives the report structure, so ranks
//! that skipped an event (conditional code paths legitimately differ by rank)
//! contribute zero duration for it rather than desynchronizing the group:
//!
//! ```
//! use deep_time::{LocalGroup, Profiler};
//!
//! # fn main() -> Result<(), deep_time::CommunicationError> {
//! let mut profiler = Profiler::new();
//! profiler.start("exchange");
//! profiler.end();
//!
//! // In a real job the group wraps e.g. an MPI communicator; LocalGroup is
//! // the trivial single-process group.
//! if let Some(report) = profiler.to_group_report(&LocalGroup)? {
//!     // Only rank 0 gets the report.
//!     report.print_to_stdout();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! A [`Profiler`] drives a single call stack and is meant for single-threaded
//! use within each process: use one profiler per thread or serialize access
//! externally. Across processes the only interaction is the collective group
//! report, which is synchronous and blocking by design - there is no timeout
//! and no partial aggregation.

mod collective;
mod event;
mod group;
mod pal;
mod profiler;
mod report;

pub use event::{EventId, EventNode};
pub use group::{CommunicationError, LocalGroup, ProcessGroup, ReduceOp};
pub use profiler::Profiler;
pub use report::{GroupReport, GroupReportRow, Report, ReportRow};
