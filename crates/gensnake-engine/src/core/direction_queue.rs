use std::collections::VecDeque;

use crate::{Direction, LogicFault};

/// Per-segment movement directions, head first.
///
/// Entry `i` is the direction segment `i` moved on the most recent frame.
/// The queue never holds more entries than the body has segments. It is one
/// entry short right after growth, and is topped up by the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionQueue {
    entries: VecDeque<Direction>,
    capacity: usize,
}

impl DirectionQueue {
    /// Creates an empty queue that can describe a snake filling `capacity` cells.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, segment: usize) -> Option<Direction> {
        self.entries.get(segment).copied()
    }

    /// Direction the head moved last.
    #[must_use]
    pub fn front(&self) -> Option<Direction> {
        self.entries.front().copied()
    }

    /// Direction the tail moved last.
    #[must_use]
    pub fn back(&self) -> Option<Direction> {
        self.entries.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.entries.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Records a new head direction and shifts every other entry one segment
    /// toward the tail, dropping entries beyond `body_len`.
    pub fn push_head(&mut self, direction: Direction, body_len: usize) -> Result<(), LogicFault> {
        self.entries.push_front(direction);
        self.entries.truncate(body_len.min(self.capacity));
        self.check_within(body_len)
    }

    /// Fails unless every one of `body_len` segments has a queued direction.
    pub fn check_covers(&self, body_len: usize) -> Result<(), LogicFault> {
        if self.entries.len() < body_len {
            return Err(LogicFault::DirectionQueueDesync {
                segment: self.entries.len(),
                queued: self.entries.len(),
                body_len,
            });
        }
        Ok(())
    }

    /// Fails if the queue describes more segments than the body has.
    pub fn check_within(&self, body_len: usize) -> Result<(), LogicFault> {
        if self.entries.len() > body_len {
            return Err(LogicFault::DirectionQueueOverflow {
                queued: self.entries.len(),
                body_len,
            });
        }
        Ok(())
    }
}

impl FromIterator<Direction> for DirectionQueue {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        let entries: VecDeque<_> = iter.into_iter().collect();
        let capacity = entries.len();
        Self { entries, capacity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Down, Left, Right, Up};

    #[test]
    fn test_push_head_shifts_toward_tail() {
        let mut q = DirectionQueue::with_capacity(9);
        q.push_head(Right, 3).unwrap();
        q.push_head(Down, 3).unwrap();
        q.push_head(Left, 3).unwrap();
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![Left, Down, Right]);
        q.push_head(Up, 3).unwrap();
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![Up, Left, Down]);
        assert_eq!(q.front(), Some(Up));
        assert_eq!(q.back(), Some(Down));
    }

    #[test]
    fn test_push_head_respects_capacity() {
        let mut q = DirectionQueue::with_capacity(2);
        for d in [Right, Right, Right] {
            q.push_head(d, 5).unwrap();
        }
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_check_covers_reports_missing_segment() {
        let q: DirectionQueue = [Right, Right].into_iter().collect();
        assert!(q.check_covers(2).is_ok());
        assert_eq!(
            q.check_covers(3),
            Err(LogicFault::DirectionQueueDesync {
                segment: 2,
                queued: 2,
                body_len: 3,
            })
        );
        assert!(q.check_within(1).is_err());
    }
}
