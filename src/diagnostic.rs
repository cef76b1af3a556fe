use std::fmt;
use std::path::PathBuf;

/// Advisory, non-fatal findings of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Token with more than one modifier.
    UnsupportedRule { token: String },
    /// Token whose modifier is not a breakpoint, pseudo-class or `dark`.
    UnknownModifier { token: String, modifier: String },
    /// File listed by discovery that was gone by the time it was read.
    VanishedFile { path: PathBuf },
}

impl Diagnostic {
    /// Logs the diagnostic and hands it back for collection.
    pub(crate) fn emit(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedRule { token } => {
                write!(f, "skipping unsupported rule '{}'", token)
            }
            Diagnostic::UnknownModifier { token, modifier } => write!(
                f,
                "skipping rule '{}': unknown modifier '{}'",
                token, modifier
            ),
            Diagnostic::VanishedFile { path } => {
                write!(f, "skipping file that no longer exists: {}", path.display())
            }
        }
    }
}
