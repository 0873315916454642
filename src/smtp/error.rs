use super::cancel::Cancelled;
use super::reply::ReplyError;
use super::response::SmtpResponse;
use thiserror::Error;

/// Faults raised by a command instead of a normal reply.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be completed. The caller is expected to send
    /// [`CommandError::reply`] and close or reset the session.
    #[error("transaction failed: {reason}")]
    TransactionFailed { reason: String },
    /// The cancellation signal fired at a suspension point.
    #[error("command cancelled")]
    Cancelled,
    /// A reply was cut off mid-line, or the channel already carries one
    /// that was. The session must be closed, nothing more can be sent.
    #[error("reply interrupted: {0}")]
    ReplyInterrupted(ReplyError),
    /// The reply channel failed while writing.
    #[error("failed to send reply: {0}")]
    Reply(#[from] std::io::Error),
}

impl CommandError {
    pub fn transaction_failed(reason: impl Into<String>) -> Self {
        Self::TransactionFailed {
            reason: reason.into(),
        }
    }

    /// The reply the caller should announce for this fault, if any.
    pub fn reply(&self) -> Option<SmtpResponse> {
        match self {
            Self::TransactionFailed { .. } => Some(SmtpResponse::transaction_failed()),
            Self::Cancelled | Self::ReplyInterrupted(_) | Self::Reply(_) => None,
        }
    }

    /// Whether the connection has to be dropped without further replies.
    pub fn must_close(&self) -> bool {
        matches!(self, Self::ReplyInterrupted(_) | Self::Reply(_))
    }
}

impl From<ReplyError> for CommandError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Cancelled => Self::Cancelled,
            ReplyError::Io(err) => Self::Reply(err),
            err @ (ReplyError::Interrupted { .. } | ReplyError::Poisoned) => {
                Self::ReplyInterrupted(err)
            }
        }
    }
}

impl From<Cancelled> for CommandError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}
