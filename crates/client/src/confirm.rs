//! Interactive confirmation for irreversible actions.

/// Asks the user to confirm an irreversible action.
///
/// Closures implement this trait, which keeps tests and scripted front-ends
/// short: `|_prompt: &str| true`.
pub trait Confirm: Send + Sync {
    /// Returns `true` if the user accepts `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Accepts every prompt (non-interactive `--yes` mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, "Confirmation assumed");
        true
    }
}
