//! # Path Matchers
//!
//! | Matcher | Pattern syntax | Params |
//! |--------|----------------|--------|
//! | `MatchitMatcher` | `/users/:id`, `/files/*rest`, `/users/{id}`, regex | named segments, catch-alls, named groups |
//! | `ExactMatcher` (testing) | literal paths, regex | named groups only |

#[cfg(feature = "matchit")]
pub mod matchit;

#[cfg(feature = "matchit")]
pub use self::matchit::MatchitMatcher;
