//! Standard middleware.

mod logging;
#[cfg(feature = "timeout")]
mod timeout;

pub use logging::Logging;
#[cfg(feature = "timeout")]
pub use timeout::Timeout;
