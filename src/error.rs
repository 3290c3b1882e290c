use std::{error, fmt, io};

/// Errors that can escape the analyzer's public API.
///
/// Per the design, most malformed-input conditions are *not* errors: unknown
/// architectures fall back to a default spec (with a `log::warn!`),
/// unparseable lines are silently ignored, and unresolved syscall numbers are
/// represented in-band as `"?"`. The only hard failure is an unreadable input
/// source.
#[derive(Debug)]
pub enum AnalyzerError {
    Io(io::Error),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read input: {err}"),
        }
    }
}

impl error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for AnalyzerError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
