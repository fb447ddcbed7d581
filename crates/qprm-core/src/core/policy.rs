use std::fmt::Display;
use tracing::warn;

/// How recoverable problems are treated: merge conflicts, mass disagreements and
/// cross-reference mismatches.
///
/// Structural parse errors ignore the policy and always abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort on the first recoverable problem.
    #[default]
    Strict,
    /// Log the problem and let the newer value win.
    Relaxed,
}

impl ErrorPolicy {
    pub fn from_relaxed(relaxed: bool) -> Self {
        if relaxed {
            ErrorPolicy::Relaxed
        } else {
            ErrorPolicy::Strict
        }
    }

    /// Returns `error` under [`ErrorPolicy::Strict`]; under [`ErrorPolicy::Relaxed`] the error
    /// is logged as a warning and `Ok(())` is returned.
    pub fn escalate<E: Display>(self, error: E) -> Result<(), E> {
        match self {
            ErrorPolicy::Strict => Err(error),
            ErrorPolicy::Relaxed => {
                warn!("{}", error);
                Ok(())
            }
        }
    }
}
