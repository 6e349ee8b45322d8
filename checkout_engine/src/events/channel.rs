//! Simple stateless pub-sub event handler
//!
//! Components subscribe to engine events and react to them. Handlers only receive the event itself and have no
//! access to the engine's internal state. They can be async.
//!
//! Events are buffered in a bounded channel. [`EventProducer::publish_event`] does not wait for space: if the buffer
//! is full, the event is dropped and an error is logged.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight jobs to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // drop the internal sender so that the handler shuts down when the last subscriber goes away
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move {
                (handler)(ev).await;
                trace!("📬️ Event handled");
            });
            // reap whatever has already finished
            while let Some(res) = jobs.try_join_next() {
                log_job_result(res);
            }
        }
        if !jobs.is_empty() {
            debug!("📬️ Waiting for {} jobs to complete", jobs.len());
        }
        while let Some(res) = jobs.join_next().await {
            log_job_result(res);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        error!("📬️ An event handler job failed: {e}");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event without waiting.
    pub fn publish_event(&self, event: E) {
        match self.sender.try_send(event) {
            Ok(()) => trace!("📬️ Event queued"),
            Err(TrySendError::Full(_)) => error!("📬️ Event buffer is full. The event has been dropped."),
            Err(TrySendError::Closed(_)) => error!("📬️ Event handler has shut down. The event has been dropped."),
        }
    }
}
