//! The retransmission queue - notification messages that have been handed
//! to a publish response and are held until the client acknowledges them,
//! so a Republish call can replay a lost message.

use std::collections::VecDeque;

use uasub_types::status_code::StatusCode;
use uasub_types::NotificationMessage;

/// A notification message queued by a subscription, stamped with the
/// publish cycle it was assembled in so its age can be judged later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    message: NotificationMessage,
    start_tick: u64,
}

impl NotificationRecord {
    pub fn new(message: NotificationMessage, start_tick: u64) -> NotificationRecord {
        NotificationRecord {
            message,
            start_tick,
        }
    }

    pub fn message(&self) -> &NotificationMessage {
        &self.message
    }

    pub fn sequence_number(&self) -> u32 {
        self.message.sequence_number
    }

    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    /// A record is aged once more than a keep alive's worth of publish
    /// cycles have passed since it was assembled.
    pub fn is_aged(&self, publish_interval_count: u64, max_keep_alive_count: u32) -> bool {
        self.start_tick + u64::from(max_keep_alive_count) < publish_interval_count
    }
}

/// Bounded FIFO of sent notification messages awaiting acknowledgement,
/// ordered oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct RetransmissionQueue {
    sent: VecDeque<NotificationRecord>,
    capacity: usize,
}

impl Default for RetransmissionQueue {
    fn default() -> RetransmissionQueue {
        RetransmissionQueue::new(crate::constants::MAX_SENT_NOTIFICATIONS)
    }
}

impl RetransmissionQueue {
    pub fn new(capacity: usize) -> RetransmissionQueue {
        RetransmissionQueue {
            sent: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sent record. If the queue is full the oldest record is
    /// evicted and returned so the caller can log what was lost.
    pub fn append(&mut self, record: NotificationRecord) -> Option<NotificationRecord> {
        self.sent.push_back(record);
        if self.sent.len() > self.capacity {
            self.sent.pop_front()
        } else {
            None
        }
    }

    /// Acknowledges the record with the given sequence number, removing it.
    pub fn ack(&mut self, sequence_number: u32) -> StatusCode {
        match self
            .sent
            .iter()
            .position(|record| record.sequence_number() == sequence_number)
        {
            Some(index) => {
                self.sent.remove(index);
                StatusCode::Good
            }
            None => StatusCode::BadSequenceNumberUnknown,
        }
    }

    /// Looks up a record for republishing.
    pub fn find(&self, sequence_number: u32) -> Option<&NotificationRecord> {
        self.sent
            .iter()
            .find(|record| record.sequence_number() == sequence_number)
    }

    /// The sequence numbers held, oldest first.
    pub fn sequence_numbers(&self) -> Vec<u32> {
        self.sent.iter().map(|record| record.sequence_number()).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sequence_number: u32) -> NotificationRecord {
        NotificationRecord::new(
            NotificationMessage::status_change(sequence_number, chrono::Utc::now(), StatusCode::Good),
            0,
        )
    }

    #[test]
    fn ack_removes_record() {
        let mut queue = RetransmissionQueue::new(10);
        queue.append(record(1));
        queue.append(record(2));
        assert_eq!(queue.ack(1), StatusCode::Good);
        assert_eq!(queue.sequence_numbers(), vec![2]);
        // A second ack of the same number no longer finds it
        assert_eq!(queue.ack(1), StatusCode::BadSequenceNumberUnknown);
    }

    #[test]
    fn ack_unknown_sequence_number() {
        let mut queue = RetransmissionQueue::new(10);
        queue.append(record(1));
        assert_eq!(queue.ack(99), StatusCode::BadSequenceNumberUnknown);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut queue = RetransmissionQueue::new(3);
        for sequence_number in 1..=3 {
            assert!(queue.append(record(sequence_number)).is_none());
        }
        let evicted = queue.append(record(4)).unwrap();
        assert_eq!(evicted.sequence_number(), 1);
        assert_eq!(queue.sequence_numbers(), vec![2, 3, 4]);
    }

    #[test]
    fn find_does_not_remove() {
        let mut queue = RetransmissionQueue::new(10);
        queue.append(record(7));
        assert_eq!(queue.find(7).unwrap().sequence_number(), 7);
        assert_eq!(queue.len(), 1);
        assert!(queue.find(8).is_none());
    }

    #[test]
    fn record_aging() {
        let record = NotificationRecord::new(
            NotificationMessage::status_change(1, chrono::Utc::now(), StatusCode::Good),
            5,
        );
        // Aged once more than a keep alive of cycles have elapsed since tick 5
        assert!(!record.is_aged(7, 3));
        assert!(!record.is_aged(8, 3));
        assert!(record.is_aged(9, 3));
    }
}
