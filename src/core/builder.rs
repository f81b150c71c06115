use std::sync::Arc;

use crate::{
    config::Config,
    publish::Publish,
    subscribers::{Subscribe, SubscriberSet},
};

use super::runtime::Runtime;

/// Builder for constructing a [`Runtime`] with optional lifecycle subscribers.
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets lifecycle event subscribers.
    ///
    /// Subscribers receive lifecycle events (starts, pauses, restarts, failures)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one lifecycle event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the runtime; every stream it creates publishes through `publisher`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build<P: Publish>(self, publisher: P) -> Runtime {
        let subs = SubscriberSet::new(self.subscribers);
        Runtime::new(self.cfg, subs, Arc::new(publisher))
    }
}
