//! Scheduling core for a multi-CPU operating-system simulator.
//!
//! This crate implements the part of an OS simulator that decides which
//! runnable process occupies each simulated CPU: a FIFO ready queue, four
//! interchangeable selection policies (FCFS, priority-aging, round robin,
//! and shortest-remaining-time-first), and the event handlers a simulator
//! harness calls when a CPU goes idle, a time slice expires, a process
//! yields for I/O, a process terminates, or a process wakes from I/O.
//!
//! The harness itself (simulated time, per-CPU threads, context
//! switching, process generation, and reporting) is not part of this
//! crate. [`simulator::Simulator`] is the capability boundary: the core
//! calls out through it, and never otherwise assumes anything about who is
//! driving it.
//!
//! ```no_run
//! use sched_core::{Policy, Scheduler};
//! use sched_core::simulator::Simulator;
//! use std::sync::Arc;
//!
//! struct MyHarness;
//! impl Simulator for MyHarness {
//!     fn get_current_time(&self) -> u64 { 0 }
//!     fn context_switch(&self, _cpu_id: usize, _chosen: Option<&sched_core::Process>, _slice: Option<u32>) {}
//!     fn force_preempt(&self, _cpu_id: usize) {}
//! }
//!
//! let scheduler = Scheduler::new(4, Policy::Rr { time_slice: 4 }, Arc::new(MyHarness));
//! scheduler.idle(0);
//! ```

pub mod config;
pub mod error;
pub mod policy;
pub mod process;
pub mod queue;
pub mod running_table;
pub mod scheduler;
pub mod simulator;

pub use config::Config;
pub use error::ConfigError;
pub use policy::Policy;
pub use process::{Process, ProcessId, ProcessState};
pub use queue::ReadyQueue;
pub use running_table::RunningTable;
pub use scheduler::Scheduler;
pub use simulator::Simulator;
