//! Simplified example demonstrating key `deep_time` types working together.
//!
//! This example shows the main flow of the package:
//! - `Profiler`: drives the event tree via start/end markers
//! - nesting: events started inside other events report as children
//! - accumulation: repeated cycles of one event sum their durations
//!
//! Run with: `cargo run --example deep_time_basic`.

use std::thread;
use std::time::Duration;

use deep_time::Profiler;

fn main() {
    println!("=== Hierarchical Wall-Clock Tracking Example ===");
    println!();

    let mut profiler = Profiler::with_name("demo");

    // A top-level phase with nested work inside it.
    profiler.start("setup");
    thread::sleep(Duration::from_millis(30));

    profiler.start("read_input");
    thread::sleep(Duration::from_millis(20));
    profiler.end();

    profiler.start("allocate");
    thread::sleep(Duration::from_millis(10));
    profiler.end();

    profiler.end(); // setup

    // An iterative phase: per-iteration events accumulate across cycles.
    profiler.start("solve");
    for _ in 0..3 {
        profiler.start_accumulating("iteration");
        thread::sleep(Duration::from_millis(15));
        profiler.end();
    }
    profiler.end(); // solve

    // Registered but never started; reports with zero duration.
    profiler.add("checkpoint");

    profiler.print_to_stdout();
    println!();
    println!("Nested events are indented under their parent phase.");
}
