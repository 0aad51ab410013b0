//! # Fallback Policy

use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    config::process_config,
    fallback::{FallbackEvent, FallbackNotifier},
};

/// What to do when a pattern needs the backtracking delegate.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum FallbackMode {
    /// Fall back without telling anyone.
    Silent = 0,

    /// Fall back, and emit a fallback notification.
    #[default]
    Notify = 1,

    /// Refuse; compilation fails with
    /// [`LinreError::UnsupportedPattern`](crate::LinreError::UnsupportedPattern).
    Raise = 2,
}

impl FallbackMode {
    /// Convert from the host binding's numeric code.
    ///
    /// ## Arguments
    /// * `code` - `0` (quietly), `1` (warning) or `2` (exception).
    ///
    /// ## Returns
    /// The mode; or `None` for an unknown code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Silent),
            1 => Some(Self::Notify),
            2 => Some(Self::Raise),
            _ => None,
        }
    }

    /// The host binding's numeric code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Does this mode permit the backtracking delegate?
    pub const fn allows_fallback(self) -> bool {
        !matches!(self, Self::Raise)
    }
}

/// Fallback configuration, consulted by the compiler at compile time only.
///
/// Most callers use the process-wide [`global_policy`]; tests and embedders
/// can build isolated instances and pass them to a
/// [`PatternCompiler`](crate::compiler::PatternCompiler).
pub struct FallbackPolicy {
    mode: AtomicU8,
    notifier: Option<Arc<dyn FallbackNotifier>>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(FallbackMode::default())
    }
}

impl core::fmt::Debug for FallbackPolicy {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("FallbackPolicy")
            .field("mode", &self.mode())
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

impl FallbackPolicy {
    /// Create a new policy.
    ///
    /// ## Arguments
    /// * `mode` - the initial mode.
    pub const fn new(mode: FallbackMode) -> Self {
        Self {
            mode: AtomicU8::new(mode.code()),
            notifier: None,
        }
    }

    /// Install a notification hook.
    ///
    /// ## Arguments
    /// * `notifier` - called once per compiled pattern that falls back in
    ///   [`FallbackMode::Notify`] mode.
    pub fn with_notifier(
        self,
        notifier: Arc<dyn FallbackNotifier>,
    ) -> Self {
        Self {
            notifier: Some(notifier),
            ..self
        }
    }

    /// The current mode.
    pub fn mode(&self) -> FallbackMode {
        FallbackMode::from_code(self.mode.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Change the mode; visible to every later compilation, on any thread.
    pub fn set_mode(
        &self,
        mode: FallbackMode,
    ) {
        self.mode.store(mode.code(), Ordering::Release);
    }

    /// Emit a fallback notification.
    pub(crate) fn notify(
        &self,
        event: &FallbackEvent,
    ) {
        log::warn!(
            "falling back to the backtracking engine for {:?}: {}",
            event.pattern,
            event.reason
        );
        if let Some(notifier) = &self.notifier {
            notifier.notify(event);
        }
    }
}

static GLOBAL_POLICY: Lazy<FallbackPolicy> =
    Lazy::new(|| FallbackPolicy::new(process_config().fallback_mode));

/// The process-wide fallback policy.
///
/// Initialised on first use from `LINRE_FALLBACK_MODE`; see [`crate::config`].
pub fn global_policy() -> &'static FallbackPolicy {
    &GLOBAL_POLICY
}

/// Set the process-wide fallback mode.
///
/// ## Arguments
/// * `mode` - the new mode; applies to every later compilation.
pub fn set_fallback_notification(mode: FallbackMode) {
    global_policy().set_mode(mode);
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(FallbackMode::from_str("silent"), Ok(FallbackMode::Silent));
        assert_eq!(FallbackMode::from_str("Notify"), Ok(FallbackMode::Notify));
        assert_eq!(FallbackMode::from_str("RAISE"), Ok(FallbackMode::Raise));
        assert!(FallbackMode::from_str("loud").is_err());

        assert_eq!(FallbackMode::Raise.to_string(), "raise");
        assert_eq!(FallbackMode::Silent.as_ref(), "silent");
    }

    #[test]
    fn test_mode_codes() {
        for mode in FallbackMode::iter() {
            assert_eq!(FallbackMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(FallbackMode::from_code(3), None);

        assert!(FallbackMode::Silent.allows_fallback());
        assert!(FallbackMode::Notify.allows_fallback());
        assert!(!FallbackMode::Raise.allows_fallback());
    }

    #[test]
    fn test_set_mode() {
        let policy = FallbackPolicy::new(FallbackMode::Silent);
        assert_eq!(policy.mode(), FallbackMode::Silent);

        policy.set_mode(FallbackMode::Raise);
        assert_eq!(policy.mode(), FallbackMode::Raise);

        let policy = Arc::new(policy);
        let handle = {
            let policy = policy.clone();
            std::thread::spawn(move || policy.set_mode(FallbackMode::Notify))
        };
        handle.join().unwrap();
        assert_eq!(policy.mode(), FallbackMode::Notify);
    }

    #[test]
    fn test_debug() {
        let policy = FallbackPolicy::new(FallbackMode::Raise);
        assert_eq!(
            format!("{policy:?}"),
            "FallbackPolicy { mode: Raise, notifier: false }"
        );
    }
}
