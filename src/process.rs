//! Process records carried through the scheduling core.

use std::fmt;

/// Opaque handle used by the ready queue and running table to address a
/// [`Process`] without borrowing it. Stable for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Lifecycle state of a process, as seen by the scheduling core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Waiting => write!(f, "waiting"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// A single simulated process.
///
/// `next` is the intrusive forward link used only while the process is
/// linked into the ready queue; it is meaningless otherwise and callers
/// must not read it directly (see [`crate::queue::ReadyQueue`]).
#[derive(Debug, Clone)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub priority: u32,
    pub arrival_time: u64,
    pub enqueue_time: u64,
    pub total_time_remaining: u64,
    pub time_in_cpu_burst: u64,
    pub state: ProcessState,
    pub(crate) next: Option<ProcessId>,
}

impl Process {
    /// Create a new process in state `New`. The harness creates records
    /// this way and raises them into the core via `wake_up`.
    pub fn new(id: ProcessId, name: impl Into<String>, priority: u32, arrival_time: u64, total_time_remaining: u64) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            arrival_time,
            enqueue_time: arrival_time,
            total_time_remaining,
            time_in_cpu_burst: 0,
            state: ProcessState::New,
            next: None,
        }
    }

    /// Priority-aging metric: smaller is more urgent. `now` must be
    /// greater than or equal to `enqueue_time`.
    pub fn aged_priority(&self, now: u64, age_weight: u64) -> f64 {
        let waited = now.saturating_sub(self.enqueue_time);
        self.priority as f64 - (waited as f64 * age_weight as f64)
    }
}
