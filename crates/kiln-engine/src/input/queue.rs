use std::collections::VecDeque;

use super::types::InputEvent;

/// Bounded FIFO between the platform event handler and the frame loop.
///
/// When full, the oldest event is dropped so the newest input always gets
/// through; every drop is logged.
#[derive(Debug)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
    capacity: usize,
    dropped: u64,
}

impl InputQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, ev: InputEvent) {
        if self.events.len() == self.capacity {
            if let Some(oldest) = self.events.pop_front() {
                self.dropped += 1;
                log::warn!(
                    "input queue full (capacity {}); dropped oldest event {:?}",
                    self.capacity,
                    oldest
                );
            }
        }
        self.events.push_back(ev);
    }

    /// Removes and yields every buffered event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of events dropped since creation.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(f: bool) -> InputEvent {
        InputEvent::Focused(f)
    }

    fn resized(width: u32) -> InputEvent {
        InputEvent::Resized { width, height: 1 }
    }

    #[test]
    fn drains_in_arrival_order() {
        let mut q = InputQueue::new(4);
        q.push(resized(1));
        q.push(resized(2));
        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained, vec![resized(1), resized(2)]);
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut q = InputQueue::new(2);
        q.push(resized(1));
        q.push(resized(2));
        q.push(resized(3));
        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained, vec![resized(2), resized(3)]);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut q = InputQueue::new(0);
        q.push(focus(true));
        q.push(focus(false));
        assert_eq!(q.capacity(), 1);
        assert_eq!(q.drain().collect::<Vec<_>>(), vec![focus(false)]);
    }
}
