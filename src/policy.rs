//! Per-policy selection rules.
//!
//! Each policy scans the ready queue at most once and extracts a single
//! winner. `Rr` skips the scan entirely and degenerates to a head-dequeue;
//! it does not share a generic scan skeleton with the other three policies.

use crate::process::{Process, ProcessId};
use crate::queue::ReadyQueue;

/// Scheduling policy, carrying whatever tunables it needs (no separate
/// global `age_weight` or `time_slice` fields floating next to the policy
/// tag).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    Fcfs,
    /// Priority aging: effective priority shrinks by `age_weight` per tick
    /// of queue residence.
    Pa { age_weight: u64 },
    /// Round robin with a fixed quantum, in ticks.
    Rr { time_slice: u32 },
    /// Shortest remaining time first.
    Srtf,
}

impl Policy {
    /// `true` for policies preemptible by the wake-up probe. RR is
    /// excluded, since it relies solely on its own timer.
    pub fn wakeup_preemptible(&self) -> bool {
        matches!(self, Policy::Pa { .. } | Policy::Srtf)
    }

    /// Time slice to hand the harness in `context_switch`, or `None` for
    /// "infinite".
    pub fn time_slice(&self) -> Option<u32> {
        match self {
            Policy::Rr { time_slice } => Some(*time_slice),
            _ => None,
        }
    }

    /// The scalar this policy minimizes, evaluated for `p` at tick `now`.
    /// Used both by the scan-based selectors above and by `wake_up`'s
    /// preemption probe, so the two never disagree about what "worse"
    /// means for a given policy.
    pub fn metric(&self, p: &Process, now: u64) -> f64 {
        match self {
            Policy::Fcfs => p.arrival_time as f64,
            Policy::Srtf => p.total_time_remaining as f64,
            Policy::Pa { age_weight } => p.aged_priority(now, *age_weight),
            Policy::Rr { .. } => 0.0,
        }
    }
}

/// Run the selector for `policy` against `queue`, extracting and returning
/// the winner (or `None` if the queue is empty).
pub fn select(queue: &mut ReadyQueue, policy: Policy, now: u64) -> Option<Process> {
    match policy {
        Policy::Fcfs => select_min_by(queue, |p| p.arrival_time as f64),
        Policy::Srtf => select_min_by(queue, |p| p.total_time_remaining as f64),
        Policy::Pa { age_weight } => select_pa(queue, now, age_weight),
        Policy::Rr { .. } => queue.dequeue_head(),
    }
}

/// Shared scan for FCFS/SRTF: minimize `metric`, strict `<`, first
/// occurrence of the minimum wins (which, by queue invariant, is also the
/// earliest-enqueued process with that value).
fn select_min_by(queue: &mut ReadyQueue, metric: impl Fn(&Process) -> f64) -> Option<Process> {
    let mut winner: Option<(ProcessId, f64)> = None;
    for p in queue.iter() {
        let value = metric(p);
        match winner {
            None => winner = Some((p.id, value)),
            Some((_, best)) if value < best => winner = Some((p.id, value)),
            _ => {}
        }
    }
    let (id, _) = winner?;
    queue.extract(id)
}

/// PA's metric is real-valued and can re-order on every tick (ageing), so
/// ties are re-checked explicitly against `arrival_time` rather than relying
/// on first-occurrence-wins.
fn select_pa(queue: &mut ReadyQueue, now: u64, age_weight: u64) -> Option<Process> {
    let mut winner: Option<(ProcessId, f64, u64)> = None;
    for p in queue.iter() {
        let metric = p.aged_priority(now, age_weight);
        match winner {
            None => winner = Some((p.id, metric, p.arrival_time)),
            Some((_, best_metric, best_arrival)) => {
                if metric < best_metric
                    || (metric == best_metric && p.arrival_time < best_arrival)
                {
                    winner = Some((p.id, metric, p.arrival_time));
                }
            }
        }
    }
    let (id, ..) = winner?;
    queue.extract(id)
}
