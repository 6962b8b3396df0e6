/// Builds the unit list of a registration call from handlers and routers.
///
/// Each argument is converted with `Unit::from`, so handlers, routers and
/// router references can be mixed in one call.
///
/// # Example
///
/// ```rust
/// use baton::{Flow, Router, middleware, units};
///
/// let api = Router::<&'static str>::new();
/// let router = Router::new();
/// router.register_at(
///     "/api/*rest",
///     units![
///         middleware(|_req, _res| async { Ok(Flow::Next) }),
///         &api,
///     ],
/// );
/// assert_eq!(router.len(), 1);
/// ```
#[macro_export]
macro_rules! units {
    () => {
        ::std::vec::Vec::<$crate::Unit<_>>::new()
    };
    ($($unit:expr),+ $(,)?) => {
        ::std::vec![$($crate::Unit::from($unit)),+]
    };
}
