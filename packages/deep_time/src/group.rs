//! The collective communication capability the profiler consumes.
//!
//! The profiler never constructs a process group; the surrounding application
//! establishes one (an MPI communicator, a fixed-size thread team, a single
//! process) and hands it in. All the profiler requires is the small collective
//! vocabulary expressed by [`ProcessGroup`]: know your rank, know the group
//! size, broadcast a value from a root rank, reduce a value onto a root rank.
//!
//! Collective operations are synchronous and all-or-nothing: every member of
//! the group must call the same operations in the same order or the whole
//! group hangs. That is an inherent characteristic of collective designs, not
//! something an implementation of this trait should try to paper over with
//! timeouts or best-effort variants.

use std::fmt::Debug;
use std::num::NonZero;

/// Elementwise reduction applied across all members of a process group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "group implementations must handle every operation; adding one is a breaking change by design"
)]
pub enum ReduceOp {
    /// The largest contributed value.
    Max,

    /// The smallest contributed value.
    Min,

    /// The sum of all contributed values.
    Sum,
}

/// Error from a failed collective operation.
///
/// A failed collective leaves the group in an indeterminate state: some members
/// may have completed the operation, others not, and no subsequent collective
/// can be trusted to line up. Callers must treat this as fatal to the whole
/// aggregation and never continue with partial results.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CommunicationError {
    /// A collective operation failed in the underlying transport.
    #[error("collective {operation} failed: {message}")]
    Collective {
        /// Which collective operation failed, e.g. `"broadcast"` or `"reduce"`.
        operation: &'static str,

        /// Transport-specific description of the failure.
        message: String,
    },

    /// A broadcast event name arrived as bytes that are not valid UTF-8.
    #[error("received malformed event name from the group authority")]
    MalformedEventName(#[from] std::string::FromUtf8Error),
}

/// A group of cooperating processes that can perform collective operations.
///
/// Mirrors the classic message-passing model: `broadcast` distributes a value
/// held by `root` to every member, `reduce` combines a value contributed by
/// every member onto `root`. Both are collective - every member must make the
/// matching call - and blocking, with no timeout.
///
/// Ranks are dense in `0..size()`. The reduction result is only meaningful on
/// the root rank; other ranks receive an unspecified value and must ignore it.
pub trait ProcessGroup: Debug {
    /// This process's rank within the group, in `0..size()`.
    fn rank(&self) -> usize;

    /// The number of processes in the group.
    fn size(&self) -> NonZero<usize>;

    /// Broadcasts `value` from rank `root` to every member of the group.
    ///
    /// On entry, only the value on rank `root` is meaningful; on successful
    /// return, every rank holds the root's value.
    fn broadcast_u64(&self, value: &mut u64, root: usize) -> Result<(), CommunicationError>;

    /// Broadcasts the contents of `buffer` from rank `root` to every member.
    ///
    /// Every rank must pass a buffer of the same length; the length itself has
    /// to be agreed on beforehand (typically via [`broadcast_u64`]).
    ///
    /// [`broadcast_u64`]: ProcessGroup::broadcast_u64
    fn broadcast_bytes(&self, buffer: &mut [u8], root: usize) -> Result<(), CommunicationError>;

    /// Reduces `value` across all members with `op`, landing the result on
    /// rank `root`.
    ///
    /// The returned value is only meaningful on the root rank.
    fn reduce_f64(&self, value: f64, op: ReduceOp, root: usize)
    -> Result<f64, CommunicationError>;
}

/// The trivial process group containing only the calling process.
///
/// Broadcasts are no-ops and every reduction returns the contributed value
/// unchanged. Useful for running group-aware code paths in a plain
/// single-process job, and as the simplest possible [`ProcessGroup`]
/// implementation.
///
/// # Examples
///
/// ```
/// use deep_time::{LocalGroup, ProcessGroup};
///
/// let group = LocalGroup;
/// assert_eq!(group.rank(), 0);
/// assert_eq!(group.size().get(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default)]
#[expect(
    clippy::exhaustive_structs,
    reason = "a unit struct with no conceivable future fields"
)]
pub struct LocalGroup;

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> NonZero<usize> {
        NonZero::<usize>::MIN
    }

    fn broadcast_u64(&self, _value: &mut u64, _root: usize) -> Result<(), CommunicationError> {
        Ok(())
    }

    fn broadcast_bytes(&self, _buffer: &mut [u8], _root: usize) -> Result<(), CommunicationError> {
        Ok(())
    }

    fn reduce_f64(
        &self,
        value: f64,
        _op: ReduceOp,
        _root: usize,
    ) -> Result<f64, CommunicationError> {
        Ok(value)
    }
}
