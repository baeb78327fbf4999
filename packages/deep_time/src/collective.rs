//! The collective synchronization-and-reduction protocol behind
//! [`Profiler::to_group_report`](crate::Profiler::to_group_report).
//!
//! After a run, different ranks may have recorded structurally different event
//! trees because control flow legitimately differs by rank. Collective
//! primitives, however, require every member of the group to issue the same
//! sequence of calls with agreed-upon sizes. The protocol therefore lets the
//! authority (rank 0) drive: at each tree level it broadcasts how many events
//! follow and then, per event, the event's name; every other rank creates the
//! event locally with zero duration if it never executed it. With the name
//! agreed on, the group reduces that event's duration (max, min, sum) onto the
//! authority and recurses into the event's children.
//!
//! This guarantees a matching broadcast/reduce sequence on every rank no
//! matter how asymmetric the trees are, at the cost of reporting a minimum of
//! zero for any event not executed by all ranks - a deliberate policy, not a
//! data gap: absence means "this rank did not run the region".
//!
//! The walk is fully synchronous and blocking with no timeout, as collective
//! designs demand; a rank that never joins the call stalls the whole group.

use std::time::Duration;

use crate::event::{EventId, EventTree};
use crate::group::{CommunicationError, ProcessGroup, ReduceOp};
use crate::report::GroupReport;

/// The rank whose tree structure drives the protocol.
const AUTHORITY: usize = 0;

/// Runs the full protocol over every tree level, landing the aggregated
/// statistics on the authority.
///
/// Collective: every rank of `group` must call this, each with its own tree.
/// Missing events are created locally as a side effect. Returns `Some` report
/// on the authority and `None` elsewhere.
pub(crate) fn aggregate<G: ProcessGroup>(
    tree: &mut EventTree,
    profiler_name: &str,
    group: &G,
) -> Result<Option<GroupReport>, CommunicationError> {
    let mut report = (group.rank() == AUTHORITY)
        .then(|| GroupReport::new(profiler_name, group.size().get()));

    let roots: Vec<(String, EventId)> = tree
        .roots()
        .map(|(name, id)| (name.to_owned(), id))
        .collect();
    aggregate_level(tree, group, &roots, None, 0, &mut report)?;

    Ok(report)
}

/// Runs protocol steps 1-6 for one tree level and recurses into children.
///
/// `level` is this rank's local view of the level in ascending name order;
/// only the authority's view determines what actually gets walked. `parent` is
/// the position at which ranks create events they are missing.
fn aggregate_level<G: ProcessGroup>(
    tree: &mut EventTree,
    group: &G,
    level: &[(String, EventId)],
    parent: Option<EventId>,
    depth: usize,
    report: &mut Option<GroupReport>,
) -> Result<(), CommunicationError> {
    // Step 1: the authority announces how many events this level has.
    let mut count =
        u64::try_from(level.len()).expect("level sizes always fit in u64 on supported platforms");
    group.broadcast_u64(&mut count, AUTHORITY)?;

    let count =
        usize::try_from(count).expect("level sizes always fit in usize on supported platforms");
    for index in 0..count {
        // Step 2: the authority announces the name of the next event. The
        // count came from the authority, so only its indexing is meaningful.
        let mut name = if group.rank() == AUTHORITY {
            level
                .get(index)
                .map(|(name, _)| name.clone())
                .expect("authority broadcast the count of its own level")
        } else {
            String::new()
        };
        broadcast_name(group, &mut name)?;

        // Step 3: ranks that never executed this event create it idle with
        // zero duration, so they contribute zero to the aggregate instead of
        // derailing the collective sequence.
        let id = match parent {
            Some(parent) => tree.child_or_insert(parent, &name),
            None => tree.root_or_insert(&name),
        };

        // Step 4: elementwise reductions, landing on the authority.
        let seconds = tree.node(id).duration().as_secs_f64();
        let max = group.reduce_f64(seconds, ReduceOp::Max, AUTHORITY)?;
        let min = group.reduce_f64(seconds, ReduceOp::Min, AUTHORITY)?;
        let sum = group.reduce_f64(seconds, ReduceOp::Sum, AUTHORITY)?;

        // Step 5: one report row on the authority.
        if let Some(report) = report.as_mut() {
            #[expect(
                clippy::cast_precision_loss,
                reason = "group sizes are far below the point where f64 loses integer precision"
            )]
            let size = group.size().get() as f64;
            report.push_row(
                &name,
                depth,
                Duration::from_secs_f64(max),
                Duration::from_secs_f64(min),
                Duration::from_secs_f64(sum / size),
            );
        }

        // Step 6: recurse with this event's children as the new level.
        let children: Vec<(String, EventId)> = tree
            .node(id)
            .children()
            .map(|(name, id)| (name.to_owned(), id))
            .collect();
        aggregate_level(
            tree,
            group,
            &children,
            Some(id),
            depth.saturating_add(1),
            report,
        )?;
    }

    Ok(())
}

/// Broadcasts an event name from the authority: length first, then the bytes.
///
/// Both transfers are collective, which is exactly what lets ranks that do not
/// know the name participate - they learn the length before sizing the buffer.
fn broadcast_name<G: ProcessGroup>(
    group: &G,
    name: &mut String,
) -> Result<(), CommunicationError> {
    let mut len =
        u64::try_from(name.len()).expect("name lengths always fit in u64 on supported platforms");
    group.broadcast_u64(&mut len, AUTHORITY)?;

    let len =
        usize::try_from(len).expect("name lengths always fit in usize on supported platforms");
    let mut bytes = vec![0_u8; len];
    if group.rank() == AUTHORITY {
        bytes.copy_from_slice(name.as_bytes());
    }
    group.broadcast_bytes(&mut bytes, AUTHORITY)?;

    if group.rank() != AUTHORITY {
        *name = String::from_utf8(bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::*;
    use crate::LocalGroup;

    fn tree_with_durations() -> EventTree {
        let mut tree = EventTree::default();
        let solve = tree.root_or_insert("solve");
        tree.node_mut(solve).duration = Duration::from_secs(2);
        let assemble = tree.child_or_insert(solve, "assemble");
        tree.node_mut(assemble).duration = Duration::from_millis(500);
        tree.root_or_insert("io");
        tree
    }

    #[test]
    fn local_group_aggregation_mirrors_the_local_tree() {
        let mut tree = tree_with_durations();

        let report = aggregate(&mut tree, "job", &LocalGroup)
            .unwrap()
            .expect("rank 0 receives the report");

        assert_eq!(report.group_size(), 1);
        let rows: Vec<_> = report
            .rows()
            .map(|row| (row.name().to_owned(), row.depth(), row.max()))
            .collect();
        assert_eq!(
            rows,
            [
                ("io".to_owned(), 0, Duration::ZERO),
                ("solve".to_owned(), 0, Duration::from_secs(2)),
                ("assemble".to_owned(), 1, Duration::from_millis(500)),
            ]
        );

        // With a single rank, max, min and average all equal the local value.
        for row in report.rows() {
            assert_eq!(row.max(), row.min());
            assert_eq!(row.max(), row.mean());
        }
    }

    #[test]
    fn aggregation_of_empty_tree_yields_empty_report() {
        let mut tree = EventTree::default();

        let report = aggregate(&mut tree, "", &LocalGroup)
            .unwrap()
            .expect("rank 0 receives the report");

        assert!(report.is_empty());
    }

    /// A group whose collectives always fail, for error propagation tests.
    #[derive(Debug)]
    struct BrokenGroup;

    impl ProcessGroup for BrokenGroup {
        fn rank(&self) -> usize {
            0
        }

        fn size(&self) -> NonZero<usize> {
            NonZero::new(2).expect("2 is nonzero")
        }

        fn broadcast_u64(
            &self,
            _value: &mut u64,
            _root: usize,
        ) -> Result<(), CommunicationError> {
            Err(CommunicationError::Collective {
                operation: "broadcast",
                message: "link down".to_owned(),
            })
        }

        fn broadcast_bytes(
            &self,
            _buffer: &mut [u8],
            _root: usize,
        ) -> Result<(), CommunicationError> {
            Err(CommunicationError::Collective {
                operation: "broadcast",
                message: "link down".to_owned(),
            })
        }

        fn reduce_f64(
            &self,
            _value: f64,
            _op: ReduceOp,
            _root: usize,
        ) -> Result<f64, CommunicationError> {
            Err(CommunicationError::Collective {
                operation: "reduce",
                message: "link down".to_owned(),
            })
        }
    }

    /// A group seen from a non-authority rank whose broadcasts deliver one
    /// event whose name bytes are not valid UTF-8.
    #[derive(Debug)]
    struct GarbledGroup {
        broadcasts: std::cell::Cell<usize>,
    }

    impl GarbledGroup {
        fn new() -> Self {
            Self {
                broadcasts: std::cell::Cell::new(0),
            }
        }
    }

    impl ProcessGroup for GarbledGroup {
        fn rank(&self) -> usize {
            1
        }

        fn size(&self) -> NonZero<usize> {
            NonZero::new(2).expect("2 is nonzero")
        }

        fn broadcast_u64(
            &self,
            value: &mut u64,
            _root: usize,
        ) -> Result<(), CommunicationError> {
            let call = self.broadcasts.get();
            self.broadcasts.set(call + 1);
            *value = match call {
                // Level event count, then the first event's name length.
                0 => 1,
                1 => 2,
                _ => panic!("aggregation must abort before any further broadcast"),
            };
            Ok(())
        }

        fn broadcast_bytes(
            &self,
            buffer: &mut [u8],
            _root: usize,
        ) -> Result<(), CommunicationError> {
            buffer.fill(0xFF);
            Ok(())
        }

        fn reduce_f64(
            &self,
            _value: f64,
            _op: ReduceOp,
            _root: usize,
        ) -> Result<f64, CommunicationError> {
            panic!("aggregation must abort before reducing a garbled event");
        }
    }

    #[test]
    fn garbled_event_name_aborts_the_aggregation() {
        let mut tree = EventTree::default();

        let result = aggregate(&mut tree, "", &GarbledGroup::new());

        assert!(matches!(
            result,
            Err(CommunicationError::MalformedEventName(_))
        ));
        // The garbled event was never created locally.
        assert!(tree.is_empty());
    }

    #[test]
    fn communication_failure_aborts_the_aggregation() {
        let mut tree = tree_with_durations();

        let result = aggregate(&mut tree, "", &BrokenGroup);

        assert!(matches!(
            result,
            Err(CommunicationError::Collective {
                operation: "broadcast",
                ..
            })
        ));
    }
}
