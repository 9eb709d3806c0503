//! Opaque handler values carried through the configuration tree.
//!
//! Registration operations on [`crate::UserConfig`] accept closures or engine
//! instances and erase them into [`Handler`] leaves so the merge algorithm
//! can treat them like any other value. Handlers are cloned by reference and
//! compared by identity; the configuration core stores them without ever
//! invoking them, leaving interpretation to the template engines downstream.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;

/// Signature shared by every callable registered through the configuration
/// API: positional arguments in, value out.
pub type HandlerFn = dyn Fn(&[Value]) -> ConfigResult<Value> + Send + Sync;

/// A registered callable or engine instance.
///
/// Two shapes exist: closures registered through operations such as
/// [`crate::UserConfig::add_filter`], and opaque library instances supplied
/// via [`crate::UserConfig::set_library`]. Cloning a handler clones the
/// reference, not the underlying object.
#[derive(Clone)]
pub struct Handler {
    kind: HandlerKind,
}

#[derive(Clone)]
enum HandlerKind {
    Callable(Arc<HandlerFn>),
    Instance(Arc<dyn Any + Send + Sync>),
}

impl Handler {
    /// Wrap a callable in a handler.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        Self {
            kind: HandlerKind::Callable(Arc::new(f)),
        }
    }

    /// Wrap an opaque engine or library instance in a handler.
    #[must_use]
    pub fn instance<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            kind: HandlerKind::Instance(Arc::new(value)),
        }
    }

    /// Whether this handler wraps a callable rather than an instance.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self.kind, HandlerKind::Callable(_))
    }

    /// Invoke the wrapped callable.
    ///
    /// # Errors
    ///
    /// Propagates the callable's own error, or returns a
    /// [`ConfigError::Validation`] when the handler wraps a library instance.
    pub fn call(&self, args: &[Value]) -> ConfigResult<Value> {
        match &self.kind {
            HandlerKind::Callable(f) => f(args),
            HandlerKind::Instance(_) => Err(ConfigError::Validation {
                key: String::from("handler"),
                message: String::from("library instances cannot be invoked as filters or tags"),
            }),
        }
    }

    /// Borrow the wrapped instance as a concrete type, if this handler wraps
    /// an instance of that type.
    #[must_use]
    pub fn downcast_instance<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        match &self.kind {
            HandlerKind::Instance(instance) => Arc::clone(instance).downcast::<T>().ok(),
            HandlerKind::Callable(_) => None,
        }
    }

    /// Whether two handlers refer to the same underlying object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (HandlerKind::Callable(a), HandlerKind::Callable(b)) => Arc::ptr_eq(a, b),
            (HandlerKind::Instance(a), HandlerKind::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            HandlerKind::Callable(_) => f.write_str("Handler(fn)"),
            HandlerKind::Instance(_) => f.write_str("Handler(instance)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloned_handlers_share_identity() {
        let handler = Handler::from_fn(|_args| Ok(Value::Null));
        let clone = handler.clone();
        assert!(handler.ptr_eq(&clone));
        assert_eq!(handler, clone);
    }

    #[test]
    fn distinct_handlers_are_unequal() {
        let first = Handler::from_fn(|_args| Ok(Value::Null));
        let second = Handler::from_fn(|_args| Ok(Value::Null));
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn instances_downcast_to_their_concrete_type() {
        let handler = Handler::instance(String::from("engine"));
        assert!(!handler.is_callable());
        let engine = handler.downcast_instance::<String>();
        assert_eq!(engine.as_deref().map(String::as_str), Some("engine"));
        assert!(handler.downcast_instance::<u32>().is_none());
    }

    #[test]
    fn calling_an_instance_fails_validation() {
        let handler = Handler::instance(42_u32);
        assert!(handler.call(&[]).is_err());
    }

    #[test]
    fn callables_receive_their_arguments() {
        let handler = Handler::from_fn(|args| Ok(args.first().cloned().unwrap_or_default()));
        let result = handler.call(&[Value::Bool(true), Value::Null]);
        assert_eq!(result.ok(), Some(Value::Bool(true)));
    }
}
