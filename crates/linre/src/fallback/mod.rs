//! # Fallback Coordination
//!
//! Some patterns use constructs the linear-time engine can not support:
//! backreferences, look-around, atomic groups. Such patterns can still be
//! compiled with the backtracking delegate, at the cost of the linear-time
//! guarantee.
//!
//! The [`FallbackPolicy`] decides what happens:
//! * [`FallbackMode::Silent`] - fall back quietly.
//! * [`FallbackMode::Notify`] - fall back; log a warning and call the
//!   installed [`FallbackNotifier`], once per compiled pattern.
//! * [`FallbackMode::Raise`] - fail the compilation.
//!
//! The policy is read at compile time only, never at match time.

mod fallback_notifier;
mod fallback_policy;

#[doc(inline)]
pub use fallback_notifier::*;
#[doc(inline)]
pub use fallback_policy::*;
