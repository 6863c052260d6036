//! Fire-and-forget notification dispatch over a bounded queue.
//!
//! ```text
//! request path
//!       |
//!       | dispatch(notification)  -> try_send, never blocks
//!       v
//! bounded mpsc queue (queue_capacity)
//!       |
//!       v
//! worker 0..workers -> render_message -> NotificationSender::send
//! ```
//!
//! A full queue drops the notification with a warning. A failed send is logged and
//! counted. Neither outcome reaches the caller of `dispatch`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::NotificationConfig;
use crate::notification::{
    domain::{Notification, render_message},
    ports::NotificationSender,
};

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Notification>>>;

/// Point-in-time dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events accepted onto the queue.
    pub enqueued: u64,
    /// Events delivered by the sender.
    pub delivered: u64,
    /// Events whose rendering or delivery failed.
    pub failed: u64,
    /// Events dropped because the queue was full or closed.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct DispatchCounters {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl DispatchCounters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            enqueued: self.enqueued.load(Ordering::SeqCst),
            delivered: self.delivered.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            dropped: self.dropped.load(Ordering::SeqCst),
        }
    }
}

/// Cloneable handle that enqueues events for delivery.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    queue: mpsc::Sender<Notification>,
    counters: Arc<DispatchCounters>,
}

/// Join handles of the delivery workers.
#[derive(Debug)]
pub struct DispatcherWorkers {
    handles: Vec<JoinHandle<()>>,
    counters: Arc<DispatchCounters>,
}

impl NotificationDispatcher {
    /// Creates the queue and spawns the delivery workers on the current
    /// tokio runtime.
    ///
    /// Capacity and worker count below one are raised to one.
    #[must_use]
    pub fn start<S>(sender: Arc<S>, config: &NotificationConfig) -> (Self, DispatcherWorkers)
    where
        S: NotificationSender + 'static,
    {
        let (queue, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let shared: SharedReceiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(DispatchCounters::default());

        let handles = (0..config.workers.max(1))
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&shared),
                    Arc::clone(&sender),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        debug!(
            queue_capacity = config.queue_capacity,
            workers = config.workers,
            "notification dispatcher started"
        );
        let workers = DispatcherWorkers {
            handles,
            counters: Arc::clone(&counters),
        };
        (Self { queue, counters }, workers)
    }

    /// Enqueues a notification without waiting for delivery.
    ///
    /// Returns `true` when it was queued. A full or closed queue drops the
    /// notification and logs a warning; callers are not expected to react.
    pub fn dispatch(&self, notification: Notification) -> bool {
        match self.queue.try_send(notification) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::SeqCst);
                true
            }
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                self.counters.dropped.fetch_add(1, Ordering::SeqCst);
                warn!(
                    task_id = %dropped.event.task_id,
                    recipient = %dropped.recipient.user_id,
                    "notification dropped: queue full"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                self.counters.dropped.fetch_add(1, Ordering::SeqCst);
                warn!(
                    task_id = %dropped.event.task_id,
                    recipient = %dropped.recipient.user_id,
                    "notification dropped: dispatcher stopped"
                );
                false
            }
        }
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }
}

impl DispatcherWorkers {
    /// Waits for every worker to finish and returns the final counters.
    ///
    /// Workers finish once every [`NotificationDispatcher`] handle has been
    /// dropped and the queue is drained.
    pub async fn join(self) -> DispatchStats {
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "notification worker terminated abnormally");
            }
        }
        self.counters.snapshot()
    }

    /// Returns the number of spawned workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` when no worker was spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

async fn run_worker<S>(
    worker_id: usize,
    receiver: SharedReceiver,
    sender: Arc<S>,
    counters: Arc<DispatchCounters>,
) where
    S: NotificationSender + ?Sized,
{
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(notification) = next else {
            break;
        };
        deliver(sender.as_ref(), &notification, &counters).await;
    }
    debug!(worker_id, "notification worker stopped");
}

async fn deliver<S>(sender: &S, notification: &Notification, counters: &DispatchCounters)
where
    S: NotificationSender + ?Sized,
{
    let task_id = notification.event.task_id;
    let recipient = &notification.recipient;
    let message = match render_message(notification) {
        Ok(message) => message,
        Err(err) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!(task_id = %task_id, error = %err, "notification not rendered");
            return;
        }
    };

    match sender.send(recipient, &message).await {
        Ok(()) => {
            counters.delivered.fetch_add(1, Ordering::SeqCst);
            debug!(
                task_id = %task_id,
                recipient = %recipient.user_id,
                "notification delivered"
            );
        }
        Err(err) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!(
                task_id = %task_id,
                recipient = %recipient.user_id,
                error = %err,
                "notification delivery failed"
            );
        }
    }
}
