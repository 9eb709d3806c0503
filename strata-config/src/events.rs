//! In-process publish/subscribe with ordered, failure-propagating dispatch.
//!
//! Build phases announce themselves through named events; project
//! configuration code subscribes via [`crate::UserConfig::on`]. Dispatch is
//! synchronous and ordered: listeners run in registration order and the
//! first failure aborts the remainder, surfacing as
//! [`ConfigError::Listener`]. Nothing is swallowed.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;

/// Outcome of a single listener invocation.
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Listener = Box<dyn FnMut(&[Value]) -> ListenerResult + Send>;

/// Named events with ordered listener lists.
#[derive(Default)]
pub struct EventBus {
    listeners: BTreeMap<String, Vec<Listener>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`, after any existing listeners.
    pub fn on(
        &mut self,
        event: impl Into<String>,
        listener: impl FnMut(&[Value]) -> ListenerResult + Send + 'static,
    ) {
        self.listeners
            .entry(event.into())
            .or_default()
            .push(Box::new(listener));
    }

    /// Invoke every listener for `event` in registration order, passing
    /// `args` to each.
    ///
    /// Emitting an event nobody listens to is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Listener`] wrapping the first listener failure;
    /// listeners registered after the failing one are not invoked.
    pub fn emit(&mut self, event: &str, args: &[Value]) -> ConfigResult<()> {
        let Some(listeners) = self.listeners.get_mut(event) else {
            return Ok(());
        };
        for listener in listeners {
            listener(args).map_err(|source| ConfigError::Listener {
                event: event.to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    /// Number of listeners subscribed to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event, listeners) in &self.listeners {
            map.entry(event, &listeners.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder(log: Arc<Mutex<Vec<i64>>>, tag: i64) -> impl FnMut(&[Value]) -> ListenerResult {
        move |_args| {
            if let Ok(mut entries) = log.lock() {
                entries.push(tag);
            }
            Ok(())
        }
    }

    fn recorded(log: &Arc<Mutex<Vec<i64>>>) -> Vec<i64> {
        log.lock().map(|entries| entries.clone()).unwrap_or_default()
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on("build.before", recorder(Arc::clone(&log), 1));
        bus.on("build.before", recorder(Arc::clone(&log), 2));
        bus.on("build.before", recorder(Arc::clone(&log), 3));

        assert!(bus.emit("build.before", &[]).is_ok());
        assert_eq!(recorded(&log), vec![1, 2, 3]);
    }

    #[test]
    fn arguments_reach_every_listener() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut bus = EventBus::new();
        bus.on("build.after", move |args| {
            if let Ok(mut entries) = sink.lock() {
                entries.extend(args.iter().filter_map(Value::as_integer));
            }
            Ok(())
        });

        assert!(bus.emit("build.after", &[Value::Integer(7)]).is_ok());
        assert_eq!(recorded(&log), vec![7]);
    }

    #[test]
    fn first_failure_aborts_remaining_listeners() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on("build.before", |_args| Err("listener broke".into()));
        bus.on("build.before", recorder(Arc::clone(&log), 2));

        let error = bus.emit("build.before", &[]);
        assert!(matches!(
            error,
            Err(ConfigError::Listener { ref event, .. }) if event == "build.before"
        ));
        assert!(recorded(&log).is_empty());
    }

    #[test]
    fn unknown_events_are_no_ops() {
        let mut bus = EventBus::new();
        assert!(bus.emit("never.registered", &[]).is_ok());
        assert_eq!(bus.listener_count("never.registered"), 0);
    }
}
