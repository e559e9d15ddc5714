//! Fire-once delayed events
//!
//! Round outcomes land a little after the collision that caused them. Rather
//! than host timers, pending outcomes sit in this queue and the tick applies
//! them once the session clock passes their fire time. Resets drop the whole
//! queue so nothing stale can land on a fresh round.

/// One pending event
#[derive(Debug, Clone, PartialEq)]
struct Scheduled<T> {
    fire_at: f32,
    /// Insertion order, breaks ties between equal fire times
    seq: u64,
    event: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelayQueue<T> {
    pending: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Queue `event` to fire `delay_ms` after `now`
    pub fn schedule(&mut self, now: f32, delay_ms: f32, event: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            fire_at: now + delay_ms.max(0.0),
            seq,
            event,
        });
    }

    /// Remove and return every event due at `now`, earliest first
    pub fn take_due(&mut self, now: f32) -> Vec<T> {
        if !self.pending.iter().any(|s| s.fire_at <= now) {
            return Vec::new();
        }

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.fire_at <= now);
        self.pending = rest;

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.event).collect()
    }

    /// Drop everything still pending
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut q = DelayQueue::new();
        q.schedule(0.0, 200.0, "evader");
        assert!(q.take_due(199.0).is_empty());
        assert_eq!(q.take_due(200.0), vec!["evader"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_due_events_come_out_in_fire_order() {
        let mut q = DelayQueue::new();
        q.schedule(0.0, 1000.0, 'b');
        q.schedule(0.0, 200.0, 'a');
        q.schedule(0.0, 1000.0, 'c');
        q.schedule(0.0, 5000.0, 'z');
        assert_eq!(q.take_due(1500.0), vec!['a', 'b', 'c']);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_cancel_all_drops_pending() {
        let mut q = DelayQueue::new();
        q.schedule(0.0, 10.0, 1);
        q.schedule(0.0, 20.0, 2);
        assert_eq!(q.cancel_all(), 2);
        assert!(q.take_due(1000.0).is_empty());
    }
}
