use super::cancel::{Cancellation, Cancelled};
use super::response::SmtpResponse;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum ReplyError {
    /// Cancelled before any byte of the reply went out.
    #[error("reply cancelled before it was sent")]
    Cancelled,
    /// Cut off part way; the peer holds a truncated reply line.
    #[error("reply interrupted after {written} of {total} bytes")]
    Interrupted { written: usize, total: usize },
    /// An earlier reply was interrupted, the stream is out of sync.
    #[error("reply channel unusable after an interrupted reply")]
    Poisoned,
    #[error("failed to send reply: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Cancelled> for ReplyError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Outbound side of a session: delivers one reply at a time.
///
/// Sending may suspend on backpressure. A cancelled send either wrote
/// nothing ([`ReplyError::Cancelled`]) or reports how far it got
/// ([`ReplyError::Interrupted`]); it never passes a truncated reply off as
/// a clean cancellation.
#[async_trait]
pub trait ReplyChannel: Send {
    async fn send_reply(
        &mut self,
        reply: &SmtpResponse,
        cancel: &Cancellation,
    ) -> Result<(), ReplyError>;
}

/// Reply channel over any async byte stream (TCP write half, TLS stream, ...).
#[derive(Debug)]
pub struct StreamReplyChannel<W> {
    writer: W,
    /// Set while a reply is partly written. Still set on entry means the
    /// previous send was dropped or cut off mid-line.
    partial: bool,
}

impl<W> StreamReplyChannel<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            partial: false,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.partial
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> ReplyChannel for StreamReplyChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_reply(
        &mut self,
        reply: &SmtpResponse,
        cancel: &Cancellation,
    ) -> Result<(), ReplyError> {
        if self.partial {
            return Err(ReplyError::Poisoned);
        }

        let bytes = reply.to_bytes();
        let total = bytes.len();
        let mut written = 0;

        while written < total {
            let n = match cancel.guard(self.writer.write(&bytes[written..])).await {
                Err(Cancelled) if written == 0 => return Err(ReplyError::Cancelled),
                Err(Cancelled) => return Err(ReplyError::Interrupted { written, total }),
                Ok(result) => result?,
            };
            if n == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
            }
            written += n;
            self.partial = true;
        }

        // The whole line is buffered; a cancelled flush still leaves the
        // peer's view undetermined.
        match cancel.guard(self.writer.flush()).await {
            Ok(result) => result?,
            Err(Cancelled) => return Err(ReplyError::Interrupted { written, total }),
        }

        self.partial = false;
        Ok(())
    }
}

/// In-memory capture of sent replies.
#[cfg(test)]
#[async_trait]
impl ReplyChannel for Vec<SmtpResponse> {
    async fn send_reply(
        &mut self,
        reply: &SmtpResponse,
        cancel: &Cancellation,
    ) -> Result<(), ReplyError> {
        if cancel.is_cancelled() {
            return Err(ReplyError::Cancelled);
        }
        self.push(reply.clone());
        Ok(())
    }
}
