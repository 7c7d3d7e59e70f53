use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use crate::output_analysis::{StatReport, Statistic, TimeStatistic};
use crate::simulator::ActorId;
use crate::utils::errors::{QueueFull, SimulationError};
use crate::utils::flaw;

use procsim_derive::Component;

/// The order in which waiting actors leave a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Discipline {
    /// The oldest arrival leaves first
    Fifo,
    /// The newest arrival leaves first
    Lifo,
}

impl Default for Discipline {
    fn default() -> Self {
        Discipline::Fifo
    }
}

#[derive(Debug, Clone, Copy)]
struct Waiter {
    actor: ActorId,
    since: f64,
}

/// The wait queue is an ordered holding area for blocked actors.  It never
/// blocks or wakes actors by itself; the `Director` enqueues an actor when
/// it blocks on a resource or gate, and dequeues it when it is released.
/// The queue only enforces its capacity, and reports a full queue as a
/// `QueueFull` outcome for the calling component to act on.  The primary
/// statistic is the waiting time of every dequeued actor.
#[derive(Debug, Clone, Component)]
pub struct WaitQueue {
    core: ComponentCore,
    capacity: usize,
    discipline: Discipline,
    waiting: VecDeque<Waiter>,
    length: TimeStatistic,
    rejections: usize,
}

impl WaitQueue {
    /// Create a wait queue.  A capacity of `None` is unbounded.
    pub fn new(
        name: &str,
        capacity: Option<usize>,
        discipline: Discipline,
        position: Position,
    ) -> Result<Self, SimulationError> {
        let capacity = capacity.unwrap_or(usize::MAX);
        if capacity < 1 {
            return Err(flaw(SimulationError::InvalidCapacity {
                component: name.to_string(),
                capacity,
            }));
        }
        Ok(Self {
            core: ComponentCore::new(name, position, "waiting time"),
            capacity,
            discipline,
            waiting: VecDeque::new(),
            length: TimeStatistic::new(&format!["{} length", name], 0.0),
            rejections: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.waiting.len() >= self.capacity
    }

    pub fn rejections(&self) -> usize {
        self.rejections
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.waiting.iter().any(|waiter| waiter.actor == actor)
    }

    /// The waiting actors, from the next to leave to the last.
    pub fn waiting(&self) -> Vec<ActorId> {
        match self.discipline {
            Discipline::Fifo => self.waiting.iter().map(|waiter| waiter.actor).collect(),
            Discipline::Lifo => self.waiting.iter().rev().map(|waiter| waiter.actor).collect(),
        }
    }

    /// The actor that leaves next, per the discipline.
    pub fn peek(&self) -> Option<ActorId> {
        match self.discipline {
            Discipline::Fifo => self.waiting.front(),
            Discipline::Lifo => self.waiting.back(),
        }
        .map(|waiter| waiter.actor)
    }

    pub fn enqueue(&mut self, actor: ActorId, now: f64) -> Result<(), QueueFull> {
        if self.is_full() {
            self.rejections += 1;
            return Err(QueueFull {
                capacity: self.capacity,
            });
        }
        self.waiting.push_back(Waiter { actor, since: now });
        self.length.accumulate(self.waiting.len() as f64, now);
        Ok(())
    }

    /// Remove the head of the queue per its discipline, tallying the time
    /// it spent waiting.
    pub fn dequeue(&mut self, now: f64) -> Option<ActorId> {
        let waiter = match self.discipline {
            Discipline::Fifo => self.waiting.pop_front(),
            Discipline::Lifo => self.waiting.pop_back(),
        }?;
        self.length.accumulate(self.waiting.len() as f64, now);
        self.core.tally(now - waiter.since);
        Some(waiter.actor)
    }

    /// Empty the queue without tallying, for model teardown.
    pub(crate) fn drain(&mut self, now: f64) -> Vec<ActorId> {
        let actors = self.waiting.drain(..).map(|waiter| waiter.actor).collect();
        self.length.accumulate(0.0, now);
        actors
    }

    pub fn length(&self) -> &TimeStatistic {
        &self.length
    }
}

impl Reportable for WaitQueue {
    fn status(&self) -> String {
        if self.capacity == usize::MAX {
            format!["{} waiting", self.waiting.len()]
        } else {
            format!["{} of {} waiting", self.waiting.len(), self.capacity]
        }
    }

    fn statistics(&self, now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report(), self.length.report(now)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(capacity: Option<usize>, discipline: Discipline) -> WaitQueue {
        WaitQueue::new("line", capacity, discipline, Position::default()).unwrap()
    }

    #[test]
    fn fifo_dequeues_in_arrival_order() {
        let mut line = queue(None, Discipline::Fifo);
        (0..4).for_each(|index| line.enqueue(ActorId(index), index as f64).unwrap());
        let order: Vec<ActorId> = (0..4).filter_map(|_| line.dequeue(10.0)).collect();
        assert_eq!(order, vec![ActorId(0), ActorId(1), ActorId(2), ActorId(3)]);
        assert!(line.dequeue(10.0).is_none());
        // Waits of 10, 9, 8 and 7
        assert!((line.statistic().mean() - 8.5).abs() < 1.0e-12);
    }

    #[test]
    fn lifo_dequeues_newest_first() {
        let mut line = queue(None, Discipline::Lifo);
        (0..3).for_each(|index| line.enqueue(ActorId(index), 0.0).unwrap());
        assert_eq!(line.waiting(), vec![ActorId(2), ActorId(1), ActorId(0)]);
        assert_eq!(line.peek(), Some(ActorId(2)));
        assert_eq!(line.dequeue(1.0), Some(ActorId(2)));
        assert_eq!(line.dequeue(1.0), Some(ActorId(1)));
    }

    #[test]
    fn full_queue_rejects() {
        let mut line = queue(Some(2), Discipline::Fifo);
        assert!(line.enqueue(ActorId(0), 0.0).is_ok());
        assert!(line.enqueue(ActorId(1), 0.0).is_ok());
        assert_eq!(line.enqueue(ActorId(2), 0.0), Err(QueueFull { capacity: 2 }));
        assert_eq!(line.len(), 2);
        assert_eq!(line.rejections(), 1);
        assert!(!line.contains(ActorId(2)));
    }

    #[test]
    fn zero_capacity_is_a_flaw() {
        assert!(matches!(
            WaitQueue::new("line", Some(0), Discipline::Fifo, Position::default()),
            Err(SimulationError::InvalidCapacity { capacity: 0, .. })
        ));
    }
}
