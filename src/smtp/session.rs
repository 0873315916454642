use super::cancel::Cancellation;
use super::error::CommandError;
use super::filter::FilterContext;
use super::mail_from::{MailFromCommand, MailFromExecutor};
use super::reply::ReplyChannel;
use super::response::SmtpResponse;
use super::transaction::MailTransaction;
use crate::config::EndpointConfig;
use std::sync::Arc;

/// SMTP session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpState {
    /// Initial state, waiting for client to send HELO/EHLO
    Connected,
    /// Client has identified itself
    Greeted,
    /// MAIL FROM has been accepted, a transaction is open
    MailFrom,
}

/// Per-connection state a command executes against.
pub struct SessionContext<R> {
    /// Endpoint the connection arrived on
    pub endpoint: Arc<EndpointConfig>,
    /// Remote address of the client
    pub remote_addr: String,
    /// Client's identification (from HELO/EHLO)
    pub client_id: String,
    /// Authenticated user (if any)
    pub authenticated_user: Option<String>,
    /// Current mail transaction
    pub transaction: MailTransaction,
    replies: R,
    replies_sent: usize,
    last_reply: Option<SmtpResponse>,
    /// Transaction as it stood when each reply was handed to the channel.
    #[cfg(test)]
    pub(crate) transaction_at_reply: Vec<(SmtpResponse, MailTransaction)>,
}

impl<R: ReplyChannel> SessionContext<R> {
    pub fn new(endpoint: Arc<EndpointConfig>, remote_addr: impl Into<String>, replies: R) -> Self {
        Self {
            endpoint,
            remote_addr: remote_addr.into(),
            client_id: String::new(),
            authenticated_user: None,
            transaction: MailTransaction::new(),
            replies,
            replies_sent: 0,
            last_reply: None,
            #[cfg(test)]
            transaction_at_reply: Vec::new(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.endpoint.require_auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated_user.is_some()
    }

    pub fn filter_context(&self) -> FilterContext<'_> {
        FilterContext {
            endpoint: &self.endpoint.name,
            remote_addr: &self.remote_addr,
            client_id: &self.client_id,
            authenticated_user: self.authenticated_user.as_deref(),
        }
    }

    /// Send one reply. The reply only counts as sent once the channel
    /// completed the write; a cancelled or failed send leaves no record.
    pub async fn reply(
        &mut self,
        response: SmtpResponse,
        cancel: &Cancellation,
    ) -> Result<(), CommandError> {
        #[cfg(test)]
        self.transaction_at_reply
            .push((response.clone(), self.transaction.clone()));

        self.replies.send_reply(&response, cancel).await?;
        self.replies_sent += 1;
        self.last_reply = Some(response);
        Ok(())
    }

    pub fn replies_sent(&self) -> usize {
        self.replies_sent
    }

    pub fn last_reply(&self) -> Option<&SmtpResponse> {
        self.last_reply.as_ref()
    }

    pub fn replies(&self) -> &R {
        &self.replies
    }

    pub fn into_replies(self) -> R {
        self.replies
    }
}

/// SMTP session for a single connection.
///
/// Commands take `&mut self`, so at most one command runs per session.
pub struct SmtpSession<R> {
    /// Current state of the session
    pub state: SmtpState,
    pub context: SessionContext<R>,
}

impl<R: ReplyChannel> SmtpSession<R> {
    pub fn new(endpoint: Arc<EndpointConfig>, remote_addr: impl Into<String>, replies: R) -> Self {
        Self {
            state: SmtpState::Connected,
            context: SessionContext::new(endpoint, remote_addr, replies),
        }
    }

    /// Record a successful HELO/EHLO.
    pub fn greeted(&mut self, client_id: impl Into<String>) {
        self.context.client_id = client_id.into();
        self.context.transaction.reset();
        self.state = SmtpState::Greeted;
    }

    /// Record a successful AUTH.
    pub fn authenticate(&mut self, user: impl Into<String>) {
        self.context.authenticated_user = Some(user.into());
    }

    /// RSET: abort the transaction and return to the greeted state.
    pub fn reset(&mut self) {
        self.context.transaction.reset();
        if self.state != SmtpState::Connected {
            self.state = SmtpState::Greeted;
        }
    }

    /// Run MAIL FROM and apply its outcome: an accepted sender opens the
    /// transaction, anything else keeps the current state.
    pub async fn mail_from(
        &mut self,
        executor: &MailFromExecutor,
        command: MailFromCommand,
        cancel: &Cancellation,
    ) -> Result<bool, CommandError> {
        let opened = executor.execute(command, &mut self.context, cancel).await?;
        if opened {
            self.state = SmtpState::MailFrom;
        }
        Ok(opened)
    }
}
