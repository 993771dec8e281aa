//! Outbound capability the scheduling core holds onto the harness.
//!
//! Modelled as a trait rather than free functions so the core never depends
//! on a concrete harness type.

use crate::process::{Process, ProcessId};

/// Everything the scheduling core calls *out* into the harness for.
///
/// Implementations must be `Send + Sync`: `context_switch` and
/// `force_preempt` may be invoked from any CPU thread or the wake-up
/// thread, concurrently.
pub trait Simulator: Send + Sync {
    /// Monotonically non-decreasing simulated tick count.
    fn get_current_time(&self) -> u64;

    /// Inform the harness which process (if any) now owns `cpu_id`, and for
    /// how many ticks (`None` = no preemption timer). Non-blocking. Called
    /// with no scheduler lock held.
    fn context_switch(&self, cpu_id: usize, chosen: Option<&Process>, slice_ticks: Option<u32>);

    /// Ask the harness to arrange a `preempt(cpu_id)` call. May be
    /// asynchronous. Called with no scheduler lock held.
    fn force_preempt(&self, cpu_id: usize);
}
