//! Example demonstrating group-aggregated reporting.
//!
//! A real distributed job hands the profiler a process group wrapping e.g. an
//! MPI communicator; every rank calls the group report collectively and rank 0
//! prints the aggregated max/min/average statistics. This example runs the
//! same code path with `LocalGroup`, the trivial single-process group, so the
//! aggregate of every event is just its local measurement.
//!
//! Run with: `cargo run --example deep_time_group_report`.

use std::thread;
use std::time::Duration;

use deep_time::{CommunicationError, LocalGroup, Profiler};

fn main() -> Result<(), CommunicationError> {
    let mut profiler = Profiler::with_name("stencil");

    profiler.start("halo_exchange");
    thread::sleep(Duration::from_millis(25));
    profiler.end();

    profiler.start("compute");
    thread::sleep(Duration::from_millis(50));

    profiler.start("boundary");
    thread::sleep(Duration::from_millis(10));
    profiler.end();

    profiler.end(); // compute

    // Collective: in a multi-process job, every rank must make this call.
    // With LocalGroup this process is rank 0 of 1 and prints the report.
    profiler.print_group_to_stdout(&LocalGroup)?;

    Ok(())
}
