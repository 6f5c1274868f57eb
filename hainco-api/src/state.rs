//! Shared handler state

use std::sync::Arc;

use hainco_core::{HaincoContext, LogEvent, LoggingService};

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<HaincoContext>,
    /// Optional event log; write failures never fail a request
    pub events: Option<Arc<LoggingService>>,
}

impl AppState {
    pub fn new(context: Arc<HaincoContext>) -> Self {
        Self {
            context,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<LoggingService>) -> Self {
        self.events = Some(events);
        self
    }

    /// Record a write in the event log
    pub fn record(&self, event: &str, resource: &str) {
        if let Some(events) = &self.events {
            if let Err(e) = events.log(LogEvent::new(event).with_resource(resource)) {
                tracing::warn!("failed to write event log: {}", e);
            }
        }
    }
}
