//! Message and routing traits for event types.

use std::sync::Arc;

/// A marker trait for events dispatched through a router.
///
/// Messages must be `Send + Sync + 'static` to be safe for async use.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All events dispatched by baton must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for Arc<T> {}

/// An event that carries the path route patterns are matched against.
///
/// # Example
///
/// ```rust
/// use baton_core::{Message, Routable};
///
/// struct Invocation {
///     path: String,
/// }
///
/// impl Message for Invocation {}
///
/// impl Routable for Invocation {
///     fn path(&self) -> &str {
///         &self.path
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not expose a request path",
    label = "missing `Routable` implementation",
    note = "Implement `Routable::path` so route patterns can be matched."
)]
pub trait Routable: Message {
    /// The path route patterns are matched against.
    fn path(&self) -> &str;
}

impl Routable for String {
    fn path(&self) -> &str {
        self
    }
}

impl Routable for &'static str {
    fn path(&self) -> &str {
        self
    }
}

impl<T: Routable> Routable for Box<T> {
    fn path(&self) -> &str {
        (**self).path()
    }
}

impl<T: Routable> Routable for Arc<T> {
    fn path(&self) -> &str {
        (**self).path()
    }
}
