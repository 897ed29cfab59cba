//! The capability a subscription consumes from the publish engine that
//! multiplexes client publish requests across the subscriptions of a
//! session. The engine parks publish requests as they arrive; the
//! subscription consumes one whenever it has a notification or keep alive
//! to send.

use uasub_types::NotificationMessage;

/// A notification message as handed to the publish engine, together with
/// the bookkeeping the publish response carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedNotification {
    pub subscription_id: u32,
    pub message: NotificationMessage,
    /// Sequence numbers still available for republish - the unacknowledged
    /// sent messages followed by the still pending ones.
    pub available_sequence_numbers: Vec<u32>,
    /// True if further notification messages are already pending behind
    /// this one.
    pub more_notifications: bool,
}

pub trait PublishEngine {
    /// Number of client publish requests parked and waiting for a
    /// subscription that has something to say.
    fn pending_publish_request_count(&self) -> usize;

    /// Consumes one parked request to send a notification message. Callers
    /// check `pending_publish_request_count` first; the engine is entitled
    /// to drop the message if no request is actually available.
    fn send_notification_message(&mut self, notification: PublishedNotification);

    /// Tries to consume one parked request to send a keep alive announcing
    /// the sequence number the next notification will carry. Returns false
    /// if no request was available.
    fn send_keep_alive_response(&mut self, subscription_id: u32, future_sequence_number: u32)
        -> bool;

    /// Invoked at the start of every subscription tick.
    fn on_tick(&mut self) {}
}
