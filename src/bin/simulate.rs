//! Reference harness binary.
//!
//! Plays the external-collaborator role the scheduling core never depends
//! on directly: it owns simulated time, spawns one thread per simulated
//! CPU plus a tiny process generator, and performs "context switches" by
//! sleeping for the chosen burst length before calling back into the
//! scheduler. It does not attempt a Gantt chart or statistics engine.
//!
//! Usage: `simulate <cpu_count> [ -r <timeslice_ms> | -p <age_weight> | -s ]`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use rand::Rng;

use sched_core::process::{Process, ProcessId, ProcessState};
use sched_core::simulator::Simulator;
use sched_core::{Config, Scheduler};

const MS_PER_TICK: u64 = 20;
const PROCESSES_PER_CPU: usize = 3;
const DEMO_DURATION: Duration = Duration::from_secs(5);

/// The harness's outbound capability implementation.
struct DemoHarness {
    start: Instant,
    /// What `context_switch` most recently handed to each CPU, read by
    /// that CPU's own thread right after the call that triggered it
    /// returns (see module docs: `context_switch` runs synchronously
    /// inside the event-handler call, so this is race-free per CPU).
    mailbox: Vec<Mutex<Option<Process>>>,
    scheduler: OnceLock<Arc<Scheduler>>,
}

impl DemoHarness {
    fn new(cpu_count: usize) -> Self {
        Self {
            start: Instant::now(),
            mailbox: (0..cpu_count).map(|_| Mutex::new(None)).collect(),
            scheduler: OnceLock::new(),
        }
    }

    fn attach(&self, scheduler: Arc<Scheduler>) {
        let _ = self.scheduler.set(scheduler);
    }

    fn take_mailbox(&self, cpu_id: usize) -> Option<Process> {
        self.mailbox[cpu_id].lock().unwrap().take()
    }
}

impl Simulator for DemoHarness {
    fn get_current_time(&self) -> u64 {
        self.start.elapsed().as_millis() as u64 / MS_PER_TICK
    }

    fn context_switch(&self, cpu_id: usize, chosen: Option<&Process>, slice_ticks: Option<u32>) {
        match chosen {
            Some(p) => {
                log::info!(
                    "cpu {cpu_id}: switch to {} (remaining={}, slice={:?})",
                    p.name,
                    p.total_time_remaining,
                    slice_ticks
                );
                *self.mailbox[cpu_id].lock().unwrap() = Some(p.clone());
            }
            None => log::debug!("cpu {cpu_id}: idle"),
        }
    }

    fn force_preempt(&self, cpu_id: usize) {
        log::debug!("cpu {cpu_id}: force-preempt requested");
        if let Some(scheduler) = self.scheduler.get() {
            let scheduler = scheduler.clone();
            std::thread::spawn(move || scheduler.preempt(cpu_id));
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("simulate: {err}");
            eprintln!("usage: simulate <cpu_count> [ -r <timeslice_ms> | -p <age_weight> | -s ]");
            std::process::exit(-1);
        }
    };

    log::info!(
        "starting simulation: {} cpu(s), policy {:?}",
        config.cpu_count,
        config.policy
    );

    let harness = Arc::new(DemoHarness::new(config.cpu_count));
    let scheduler = Arc::new(Scheduler::new(config.cpu_count, config.policy, harness.clone()));
    harness.attach(scheduler.clone());

    let next_pid = Arc::new(AtomicU64::new(1));

    let generator = {
        let scheduler = scheduler.clone();
        let next_pid = next_pid.clone();
        let process_count = config.cpu_count * PROCESSES_PER_CPU;
        std::thread::spawn(move || run_generator(scheduler, next_pid, process_count))
    };

    let cpu_threads: Vec<_> = (0..config.cpu_count)
        .map(|cpu_id| {
            let scheduler = scheduler.clone();
            let harness = harness.clone();
            std::thread::spawn(move || run_cpu(cpu_id, scheduler, harness))
        })
        .collect();

    let _ = generator.join();
    std::thread::sleep(DEMO_DURATION);
    log::info!("demo window elapsed, exiting");
    drop(cpu_threads); // detached worker threads; process exit tears them down
}

/// Minimal process generator: not a faithful load model, just enough demo
/// traffic to exercise every event handler once.
fn run_generator(scheduler: Arc<Scheduler>, next_pid: Arc<AtomicU64>, count: usize) {
    let mut rng = rand::thread_rng();
    for i in 0..count {
        let id = ProcessId(next_pid.fetch_add(1, Ordering::SeqCst));
        let priority = rng.gen_range(0..20);
        let remaining = rng.gen_range(3..12);
        let mut process = Process::new(id, format!("proc-{}", id.0), priority, i as u64, remaining);
        process.state = ProcessState::New;
        scheduler.wake_up(process);
        std::thread::sleep(Duration::from_millis(MS_PER_TICK * rng.gen_range(1..4)));
    }
}

fn run_cpu(cpu_id: usize, scheduler: Arc<Scheduler>, harness: Arc<DemoHarness>) {
    loop {
        scheduler.idle(cpu_id);
        let Some(process) = harness.take_mailbox(cpu_id) else {
            continue;
        };
        run_one_burst(cpu_id, process, &scheduler);
    }
}

fn run_one_burst(cpu_id: usize, process: Process, scheduler: &Arc<Scheduler>) {
    let slice = scheduler.policy().time_slice();
    let run_ticks = slice
        .map(|s| (s as u64).min(process.total_time_remaining))
        .unwrap_or(process.total_time_remaining)
        .max(1);

    std::thread::sleep(Duration::from_millis(MS_PER_TICK * run_ticks));

    let remaining_after = process.total_time_remaining.saturating_sub(run_ticks);

    if remaining_after == 0 {
        if let Some(done) = scheduler.terminate(cpu_id) {
            log::info!("cpu {cpu_id}: {} terminated", done.name);
        }
        return;
    }

    if let Some(quantum) = slice {
        if run_ticks >= quantum as u64 {
            scheduler.preempt(cpu_id);
            return;
        }
    }

    // Ran out of burst before using the whole quantum: simulate I/O.
    if let Some(waiting_id) = scheduler.yield_(cpu_id) {
        log::debug!("cpu {cpu_id}: {waiting_id} yields for I/O");
        let mut reawoken = process;
        reawoken.total_time_remaining = remaining_after;
        reawoken.state = ProcessState::Waiting;

        let scheduler = scheduler.clone();
        std::thread::spawn(move || {
            let io_ticks = rand::thread_rng().gen_range(1..=5);
            std::thread::sleep(Duration::from_millis(MS_PER_TICK * io_ticks));
            scheduler.wake_up(reawoken);
        });
    }
}
