use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ImageError {
    pub kind: FailureKind,
    pub message: String,
}

impl ImageError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True for failures reaching either endpoint, timeouts included.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport | FailureKind::Timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Timeout,
    /// Token endpoint rejected the grant or returned an unusable body.
    Auth { status: Option<u16> },
    /// Feed endpoint returned a non-success status or an unparseable listing.
    Fetch { status: Option<u16> },
    NoQualifyingImage,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Auth { status: Some(code) } => {
                write!(f, "authentication failed (http status {code})")
            }
            FailureKind::Auth { status: None } => write!(f, "authentication failed"),
            FailureKind::Fetch { status: Some(code) } => {
                write!(f, "feed retrieval failed (http status {code})")
            }
            FailureKind::Fetch { status: None } => write!(f, "feed retrieval failed"),
            FailureKind::NoQualifyingImage => write!(f, "no qualifying image"),
        }
    }
}
