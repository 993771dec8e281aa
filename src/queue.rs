//! Ready queue: a singly-linked FIFO of processes, threaded through an
//! index-backed arena (a `HashMap<ProcessId, Process>` plus head/tail ids)
//! rather than raw intrusive pointers.
//!
//! The queue itself is not a priority structure; see [`crate::policy`] for
//! the per-policy scan-and-extract rules that impose ordering on top of it.

use std::collections::HashMap;

use crate::process::{Process, ProcessId};

/// FIFO-ordered ready queue. Insertion order is preserved; extraction order
/// is whatever the caller (the selector) chooses via [`ReadyQueue::extract`].
#[derive(Debug, Default)]
pub struct ReadyQueue {
    slots: HashMap<ProcessId, Process>,
    head: Option<ProcessId>,
    tail: Option<ProcessId>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Stamp `enqueue_time`, clear `next`, and append at the tail. O(1).
    ///
    /// Precondition: `process.id` is not already linked into this queue.
    pub fn enqueue(&mut self, mut process: Process, now: u64) {
        debug_assert!(
            !self.slots.contains_key(&process.id),
            "enqueue of an already-linked process"
        );
        process.enqueue_time = now;
        process.next = None;
        let id = process.id;

        self.slots.insert(id, process);

        match self.tail {
            Some(tail_id) => {
                if let Some(tail) = self.slots.get_mut(&tail_id) {
                    tail.next = Some(id);
                }
                self.tail = Some(id);
            }
            None => {
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
    }

    /// Remove and return the head of the queue, or `None` if empty.
    pub fn dequeue_head(&mut self) -> Option<Process> {
        let head_id = self.head?;
        self.extract(head_id)
    }

    /// Unlink and return a specific process by id, fixing up head/tail as
    /// needed. Walks the list to find the node's predecessor, since the
    /// link is singly-threaded.
    pub fn extract(&mut self, id: ProcessId) -> Option<Process> {
        if !self.slots.contains_key(&id) {
            return None;
        }

        if self.head == Some(id) {
            let process = self.slots.remove(&id)?;
            self.head = process.next;
            if self.head.is_none() {
                self.tail = None;
            }
            return Some(process);
        }

        // Find the predecessor by walking from head.
        let mut prev_id = self.head?;
        loop {
            let next_of_prev = self.slots.get(&prev_id).and_then(|p| p.next);
            match next_of_prev {
                Some(candidate) if candidate == id => break,
                Some(candidate) => prev_id = candidate,
                None => return None,
            }
        }

        let process = self.slots.remove(&id)?;
        if let Some(prev) = self.slots.get_mut(&prev_id) {
            prev.next = process.next;
        }
        if self.tail == Some(id) {
            self.tail = Some(prev_id);
        }
        Some(process)
    }

    /// Iterate the queue in FIFO order without removing anything. Used by
    /// the selector to scan for the policy winner.
    pub fn iter(&self) -> ReadyQueueIter<'_> {
        ReadyQueueIter {
            queue: self,
            current: self.head,
        }
    }
}

pub struct ReadyQueueIter<'a> {
    queue: &'a ReadyQueue,
    current: Option<ProcessId>,
}

impl<'a> Iterator for ReadyQueueIter<'a> {
    type Item = &'a Process;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let process = self.queue.slots.get(&id)?;
        self.current = process.next;
        Some(process)
    }
}
