use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::ActorId;

/// A pending resumption of an actor.  Events are ordered by time, and
/// events at equal times by the order in which they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub actor: ActorId,
    pub sequence: u64,
}

impl Eq for Event {}

impl Ord for Event {
    // Reversed, so the max-heap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The time-ordered event list of a `Director`.
#[derive(Debug, Default)]
pub struct EventList {
    heap: BinaryHeap<Event>,
    next_sequence: u64,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f64, actor: ActorId) -> Event {
        let event = Event {
            time,
            actor,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.heap.push(event);
        event
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|event| event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Discard every pending event, returning the actors they would have
    /// resumed.
    /// Keep only the events for which `keep` holds.
    pub fn retain<F: FnMut(&Event) -> bool>(&mut self, mut keep: F) {
        let events = std::mem::take(&mut self.heap).into_vec();
        self.heap = events.into_iter().filter(|event| keep(event)).collect();
    }

    pub fn clear(&mut self) -> Vec<ActorId> {
        self.heap.drain().map(|event| event.actor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_event_pops_first() {
        let mut events = EventList::new();
        events.push(5.0, ActorId(0));
        events.push(1.5, ActorId(1));
        events.push(3.0, ActorId(2));
        assert_eq!(events.peek_time(), Some(1.5));
        let times: Vec<f64> = std::iter::from_fn(|| events.pop()).map(|event| event.time).collect();
        assert_eq!(times, vec![1.5, 3.0, 5.0]);
        assert!(events.is_empty());
    }

    #[test]
    fn equal_times_pop_in_insertion_order() {
        let mut events = EventList::new();
        (0..6).for_each(|index| {
            events.push(2.0, ActorId(index));
        });
        events.push(1.0, ActorId(9));
        let actors: Vec<ActorId> = std::iter::from_fn(|| events.pop()).map(|event| event.actor).collect();
        assert_eq!(
            actors,
            vec![
                ActorId(9),
                ActorId(0),
                ActorId(1),
                ActorId(2),
                ActorId(3),
                ActorId(4),
                ActorId(5)
            ]
        );
    }

    #[test]
    fn retain_keeps_order_of_the_survivors() {
        let mut events = EventList::new();
        (0..4).for_each(|index| {
            events.push(1.0, ActorId(index));
        });
        events.retain(|event| event.actor != ActorId(1));
        let actors: Vec<ActorId> = std::iter::from_fn(|| events.pop()).map(|event| event.actor).collect();
        assert_eq!(actors, vec![ActorId(0), ActorId(2), ActorId(3)]);
    }
}
