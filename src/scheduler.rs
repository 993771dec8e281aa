//! The scheduling core: event handlers and the internal schedule step.
//!
//! `Scheduler` bundles the ready queue, the running table, their
//! synchronization primitives, the policy, and the outbound `Simulator`
//! capability into one owned value, in place of process-wide globals.

use std::sync::{Arc, Condvar, Mutex};

use crate::policy::{self, Policy};
use crate::process::{Process, ProcessId, ProcessState};
use crate::queue::ReadyQueue;
use crate::running_table::RunningTable;
use crate::simulator::Simulator;

pub struct Scheduler {
    policy: Policy,
    queue: Mutex<ReadyQueue>,
    queue_not_empty: Condvar,
    running: Mutex<RunningTable>,
    simulator: Arc<dyn Simulator>,
}

impl Scheduler {
    pub fn new(cpu_count: usize, policy: Policy, simulator: Arc<dyn Simulator>) -> Self {
        assert!(cpu_count > 0, "cpu_count must be at least 1");
        Self {
            policy,
            queue: Mutex::new(ReadyQueue::new()),
            queue_not_empty: Condvar::new(),
            running: Mutex::new(RunningTable::new(cpu_count)),
            simulator,
        }
    }

    pub fn cpu_count(&self) -> usize {
        self.running.lock().unwrap().cpu_count()
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Length of the ready queue, for diagnostics/tests only.
    pub fn ready_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    // ===================== Event handlers =====================

    /// Called when the harness has no process to run on `cpu_id`. Blocks
    /// until the ready queue has something for the schedule step to find.
    pub fn idle(&self, cpu_id: usize) {
        {
            let mut queue = self.queue.lock().unwrap();
            while queue.is_empty() {
                queue = self.queue_not_empty.wait(queue).unwrap();
            }
        }
        self.schedule_step(cpu_id);
    }

    /// Called when RR's timer fires, or when a `force_preempt` request is
    /// honored by the harness.
    pub fn preempt(&self, cpu_id: usize) {
        let taken = {
            let mut running = self.running.lock().unwrap();
            running.take(cpu_id)
        };

        if let Some(mut process) = taken {
            process.state = ProcessState::Ready;
            let now = self.simulator.get_current_time();
            {
                let mut queue = self.queue.lock().unwrap();
                queue.enqueue(process, now);
            }
            self.queue_not_empty.notify_one();
        }

        self.schedule_step(cpu_id);
    }

    /// Called when the running process on `cpu_id` initiates I/O.
    ///
    /// The cell is *not* cleared here (the schedule step's own write is
    /// what hands the cell to whichever process is selected next). To make
    /// that hand-off explicit rather than an implicit overwrite, the
    /// waiting process's id is returned directly.
    pub fn yield_(&self, cpu_id: usize) -> Option<ProcessId> {
        let waiting_id = {
            let mut running = self.running.lock().unwrap();
            running.get_mut(cpu_id).map(|p| {
                p.state = ProcessState::Waiting;
                p.id
            })
        };

        self.schedule_step(cpu_id);
        waiting_id
    }

    /// Called when the running process on `cpu_id` completes. A no-op if
    /// the cell already has no occupant.
    pub fn terminate(&self, cpu_id: usize) -> Option<Process> {
        let terminated = {
            let mut running = self.running.lock().unwrap();
            running.take(cpu_id)
        }
        .map(|mut p| {
            p.state = ProcessState::Terminated;
            p
        });

        self.schedule_step(cpu_id);
        terminated
    }

    /// Called when `process`'s I/O completes.
    pub fn wake_up(&self, mut process: Process) {
        process.state = ProcessState::Ready;
        let now = self.simulator.get_current_time();
        process.enqueue_time = now;
        let waker = process.clone();

        {
            let mut queue = self.queue.lock().unwrap();
            queue.enqueue(process, now);
        }
        self.queue_not_empty.notify_one();

        if self.policy.wakeup_preemptible() {
            self.preemption_probe(&waker, now);
        }
    }

    // ===================== Internals =====================

    /// Find the worst-metric running occupant and ask the harness to
    /// preempt it if the waker is strictly better. Never
    /// mutates another CPU's running-table cell directly: only
    /// `force_preempt` crosses to another CPU, preserving the invariant
    /// that a cell is written only by its owning CPU's thread (or the
    /// schedule step running on its behalf).
    fn preemption_probe(&self, waker: &Process, now: u64) {
        let worst = {
            let running = self.running.lock().unwrap();
            if running.has_idle_cpu() {
                return;
            }

            let mut worst: Option<(usize, f64)> = None;
            for (cpu_id, occupant) in running.iter() {
                if let Some(p) = occupant {
                    let metric = self.policy.metric(p, now);
                    match worst {
                        None => worst = Some((cpu_id, metric)),
                        Some((_, best)) if metric > best => worst = Some((cpu_id, metric)),
                        _ => {}
                    }
                }
            }
            worst
        };

        if let Some((target_cpu, worst_metric)) = worst {
            let waker_metric = self.policy.metric(waker, now);
            if waker_metric < worst_metric {
                self.simulator.force_preempt(target_cpu);
            }
        }
    }

    /// Run the selector under the queue lock, install the winner into the
    /// running table under its lock, then hand off to the harness with no
    /// lock held.
    fn schedule_step(&self, cpu_id: usize) {
        let now = self.simulator.get_current_time();

        let mut chosen = {
            let mut queue = self.queue.lock().unwrap();
            policy::select(&mut queue, self.policy, now)
        };

        if let Some(p) = chosen.as_mut() {
            p.state = ProcessState::Running;
        }
        let callback_copy = chosen.clone();

        {
            let mut running = self.running.lock().unwrap();
            running.set(cpu_id, chosen);
        }

        let slice = self.policy.time_slice();
        self.simulator
            .context_switch(cpu_id, callback_copy.as_ref(), slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::mock::{Call, MockSimulator};
    use std::sync::Arc;
    use std::time::Duration;

    fn ready(id: u64, priority: u32, arrival: u64, remaining: u64) -> Process {
        let mut p = Process::new(ProcessId(id), format!("p{id}"), priority, arrival, remaining);
        p.state = ProcessState::New;
        p
    }

    #[test]
    fn terminate_on_empty_cell_is_a_no_op() {
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Fcfs, sim);
        assert!(sched.terminate(0).is_none());
    }

    #[test]
    fn fcfs_end_to_end_ordering() {
        // A(arrival 0), B(arrival 2), C(arrival 1) enqueued via wake_up,
        // then terminate(0) repeatedly -> A, C, B.
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Fcfs, sim.clone());

        sched.wake_up(ready(1, 0, 0, 5)); // A
        sched.wake_up(ready(2, 0, 2, 5)); // B
        sched.wake_up(ready(3, 0, 1, 5)); // C

        sched.idle(0);
        assert_eq!(sched.terminate(0).unwrap().id, ProcessId(1)); // A done, C picked
        assert_eq!(sched.terminate(0).unwrap().id, ProcessId(3)); // C done, B picked
        assert_eq!(sched.terminate(0).unwrap().id, ProcessId(2)); // B done, idle queued next
    }

    #[test]
    fn rr_preempt_cycles_through_ready_queue() {
        // time_slice=2, A/B round-robin.
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Rr { time_slice: 2 }, sim.clone());

        sched.wake_up(ready(1, 0, 0, 100)); // A
        sched.wake_up(ready(2, 0, 1, 100)); // B

        sched.idle(0); // A runs
        sched.preempt(0); // A re-enqueued, B selected
        sched.preempt(0); // B re-enqueued, A selected

        let switches: Vec<_> = sim
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ContextSwitch { chosen: Some(id), .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(switches, vec![ProcessId(1), ProcessId(2), ProcessId(1)]);
    }

    #[test]
    fn fcfs_is_never_force_preempted_on_wake_up() {
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Fcfs, sim.clone());

        sched.wake_up(ready(1, 0, 0, 1000)); // A
        sched.idle(0); // A runs

        sched.wake_up(ready(2, 0, 1, 1)); // B, much shorter, irrelevant to FCFS

        assert!(sim.calls().into_iter().all(|c| !matches!(c, Call::ForcePreempt { .. })));
    }

    #[test]
    fn srtf_wake_up_preempts_worst_running_cpu() {
        // Two CPUs, SRTF; C(remain=10) wakes while A(remain=100) runs on
        // CPU 0 and B(remain=100) runs on CPU 1.
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(2, Policy::Srtf, sim.clone());

        sched.wake_up(ready(1, 0, 0, 100)); // A
        sched.wake_up(ready(2, 0, 0, 100)); // B
        sched.idle(0); // A on CPU 0
        sched.idle(1); // B on CPU 1

        sched.wake_up(ready(3, 0, 0, 10)); // C: shorter than both

        let forced: Vec<_> = sim
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ForcePreempt { cpu_id } => Some(cpu_id),
                _ => None,
            })
            .collect();
        assert_eq!(forced, vec![0]); // ties -> first index (CPU 0)
    }

    #[test]
    fn wake_up_does_not_probe_when_a_cpu_is_idle() {
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(2, Policy::Srtf, sim.clone());

        sched.wake_up(ready(1, 0, 0, 5));

        assert!(sim.calls().into_iter().all(|c| !matches!(c, Call::ForcePreempt { .. })));
    }

    #[test]
    fn yield_then_wake_up_returns_process_to_ready_and_then_running() {
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Fcfs, sim.clone());

        sched.wake_up(ready(1, 0, 0, 10));
        sched.idle(0);

        let waiting = sched.yield_(0);
        assert_eq!(waiting, Some(ProcessId(1)));

        // Harness now owns the waiting process; it later wakes it back up.
        let mut revived = ready(1, 0, 0, 10);
        revived.state = ProcessState::Waiting;
        sched.wake_up(revived);
        sched.idle(0);

        let switches: Vec<_> = sim
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ContextSwitch { chosen: Some(id), .. } => Some(id),
                _ => None,
            })
            .collect();
        assert!(switches.iter().filter(|&&id| id == ProcessId(1)).count() >= 2);
    }

    #[test]
    fn idle_blocks_until_wake_up_from_another_thread() {
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Arc::new(Scheduler::new(1, Policy::Fcfs, sim.clone()));

        let sched_clone = sched.clone();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            sched_clone.wake_up(ready(1, 0, 0, 5));
        });

        sched.idle(0); // blocks until the thread above wakes P
        waker.join().unwrap();

        assert!(sim
            .calls()
            .into_iter()
            .any(|c| matches!(c, Call::ContextSwitch { chosen: Some(id), .. } if id == ProcessId(1))));
    }

    #[test]
    fn preempt_on_otherwise_empty_queue_reselects_same_process() {
        // Round-trip law: preempt immediately followed by schedule on an
        // otherwise-empty queue re-selects the same process (RR).
        let sim = Arc::new(MockSimulator::new(0));
        let sched = Scheduler::new(1, Policy::Rr { time_slice: 1 }, sim.clone());

        sched.wake_up(ready(1, 0, 0, 10));
        sched.idle(0);
        sched.preempt(0);

        let switches: Vec<_> = sim
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ContextSwitch { chosen, .. } => Some(chosen),
                _ => None,
            })
            .collect();
        assert_eq!(switches, vec![Some(ProcessId(1)), Some(ProcessId(1))]);
    }
}
