/// Per-module FIFO mailbox with an event-signaled readiness notification.
///
/// Corresponds to `nn_message_queue` (`src/core/nn_message_queue.c`):
/// there, readiness is an `eventfd` that a worker thread polls with a
/// multiplexer; here `tokio::sync::Notify` plays the same role for a
/// `tokio::task` worker. The invariant is preserved: every `send` wakes
/// (or primes) exactly one pending `notified()`, and a reader that finds
/// nothing after being woken must keep calling `receive()` until it
/// returns `None` rather than assume one notification means one message.
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::BusError;
use crate::message::Message;

#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    Timeout,
}

#[derive(Debug, Default)]
struct Inner {
    queue: Mutex<VecDeque<Message>>,
    notify: Notify,
}

/// A clonable handle to one module's mailbox. Cloning shares the same
/// underlying queue (it is a handle, not a copy of the queue).
#[derive(Debug, Clone)]
pub struct Mailbox {
    inner: std::sync::Arc<Inner>,
}

impl Mailbox {
    pub fn create() -> Self {
        Self {
            inner: std::sync::Arc::new(Inner::default()),
        }
    }

    /// Enqueue a message. MPMC-safe: any number of senders may call this
    /// concurrently with any number of readers draining via `receive`.
    pub fn send(&self, msg: Message) -> Result<(), BusError> {
        {
            let mut q = self.inner.queue.lock().unwrap();
            q.push_back(msg);
        }
        // Wake a waiter, or prime the next `notified()` call if none is
        // waiting yet — this is what keeps "eventfd readable iff queue
        // non-empty" true even across the race where send() and wait()
        // interleave.
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Pop the head of the queue, if any. Non-blocking.
    pub fn receive(&self) -> Option<Message> {
        self.inner.queue.lock().unwrap().pop_front()
    }

    /// Block until the readiness signal fires or `timeout` elapses.
    ///
    /// Does not itself guarantee a message is available (see module docs);
    /// callers must loop on `receive()` until it returns `None`.
    pub async fn wait(&self, timeout: Duration) -> WaitOutcome {
        match tokio::time::timeout(timeout, self.inner.notify.notified()).await {
            Ok(_) => WaitOutcome::Ready,
            Err(_) => WaitOutcome::Timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain all remaining messages, dropping them. Called once a module is
    /// being torn down; satisfies the "no leak on disconnect" property since
    /// `Message`/`Payload` free their memory on drop regardless of which
    /// `Payload` variant they hold.
    pub fn destroy(&self) {
        let drained: Vec<Message> = {
            let mut q = self.inner.queue.lock().unwrap();
            q.drain(..).collect()
        };
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "mailbox destroyed with pending messages");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    fn msg(n: u32) -> Message {
        Message::new(MessageType::Custom(n), 1, format!("m{n}").into_bytes())
    }

    #[test]
    fn fifo_ordering() {
        let mb = Mailbox::create();
        mb.send(msg(1)).unwrap();
        mb.send(msg(2)).unwrap();
        mb.send(msg(3)).unwrap();

        let got: Vec<u32> = std::iter::from_fn(|| mb.receive())
            .map(|m| u32::from(m.msg_type))
            .collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn receive_on_empty_is_none() {
        let mb = Mailbox::create();
        assert!(mb.receive().is_none());
    }

    #[tokio::test]
    async fn wait_times_out_when_empty() {
        let mb = Mailbox::create();
        let outcome = mb.wait(Duration::from_millis(20)).await;
        assert_eq!(outcome, WaitOutcome::Timeout);
    }

    #[tokio::test]
    async fn wait_wakes_on_send() {
        let mb = Mailbox::create();
        let mb2 = mb.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            mb2.send(msg(1)).unwrap();
        });
        let outcome = mb.wait(Duration::from_secs(1)).await;
        assert_eq!(outcome, WaitOutcome::Ready);
        assert!(mb.receive().is_some());
    }

    #[test]
    fn destroy_drains_without_panic() {
        let mb = Mailbox::create();
        mb.send(msg(1)).unwrap();
        mb.send(msg(2)).unwrap();
        mb.destroy();
        assert!(mb.receive().is_none());
    }
}
