//! Status output for the agent CLI.

use tracing::info;

use muster_core::StatusSink;

/// Sink that prints statuses for the operator and mirrors them to the
/// tracing subscriber.
#[derive(Debug, Default)]
pub struct PrintSink;

impl StatusSink for PrintSink {
  fn emit(&mut self, message: &str) {
    info!(status = message, "status updated");
    println!("status: {}", message);
  }
}
