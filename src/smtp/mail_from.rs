//! MAIL FROM: opening a mail transaction.
//!
//! The executor gates on authentication, resets the transaction, checks the
//! declared size against the server limit and asks a freshly created sender
//! filter for a verdict. It sends exactly one reply and returns whether the
//! session should move into the open-transaction state; moving is up to the
//! caller.

use super::cancel::Cancellation;
use super::error::CommandError;
use super::filter::FilterDecision;
use super::reply::ReplyChannel;
use super::response::SmtpResponse;
use super::session::SessionContext;
use super::transaction::{MailParameters, Mailbox};
use crate::config::ServerPolicy;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A parsed `MAIL FROM:<reverse-path> [parameters]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailFromCommand {
    pub address: Mailbox,
    pub parameters: MailParameters,
}

impl MailFromCommand {
    pub fn new(address: Mailbox, parameters: MailParameters) -> Self {
        Self {
            address,
            parameters,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailFromExecutor {
    policy: Arc<ServerPolicy>,
}

impl MailFromExecutor {
    pub fn new(policy: Arc<ServerPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ServerPolicy {
        &self.policy
    }

    /// Returns `Ok(true)` when the sender was accepted and the transaction
    /// is open, `Ok(false)` when a rejection was sent. Errors carry no
    /// reply from this call; see [`CommandError::reply`].
    #[instrument(
        name = "mail_from",
        skip_all,
        fields(endpoint = %ctx.endpoint.name, remote = %ctx.remote_addr, sender = %command.address)
    )]
    pub async fn execute<R: ReplyChannel>(
        &self,
        command: MailFromCommand,
        ctx: &mut SessionContext<R>,
        cancel: &Cancellation,
    ) -> Result<bool, CommandError> {
        let MailFromCommand {
            address,
            parameters,
        } = command;

        if ctx.requires_auth() && !ctx.is_authenticated() {
            debug!("authentication required");
            ctx.reply(SmtpResponse::auth_required(), cancel).await?;
            return Ok(false);
        }

        // A new attempt always discards the previous transaction, even if
        // it is about to be rejected.
        ctx.transaction.begin(parameters);
        let declared_size = ctx.transaction.parameters.declared_size();

        if self.policy.exceeds_limit(declared_size) {
            info!(
                declared_size,
                max_message_size = self.policy.max_message_size,
                "declared size over limit"
            );
            ctx.reply(SmtpResponse::size_exceeded(), cancel).await?;
            return Ok(false);
        }

        let verdict = {
            let filter_ctx = ctx.filter_context();
            let mut filter = self.policy.filters.create(&filter_ctx);
            let verdict = cancel
                .guard(filter.decide(&filter_ctx, &address, declared_size, cancel))
                .await?;
            verdict
        };

        let decision = match verdict {
            Ok(decision) => decision,
            Err(err) => {
                warn!(error = %err, "sender filter broke its contract");
                return Err(CommandError::transaction_failed(err.to_string()));
            }
        };

        let reply = match decision {
            FilterDecision::Accept => return accept(ctx, address, cancel).await,
            FilterDecision::RejectTemporary => {
                SmtpResponse::mailbox_unavailable_temp(address.as_str())
            }
            FilterDecision::RejectPermanent => SmtpResponse::mailbox_name_not_allowed(),
            FilterDecision::SizeLimitExceeded => SmtpResponse::size_exceeded(),
        };

        info!(%decision, code = reply.code, declared_size, "sender rejected by filter");
        ctx.reply(reply, cancel).await?;
        Ok(false)
    }
}

/// Commit the sender, then announce it. If the announcement does not go
/// out the commit is undone.
async fn accept<R: ReplyChannel>(
    ctx: &mut SessionContext<R>,
    address: Mailbox,
    cancel: &Cancellation,
) -> Result<bool, CommandError> {
    let reply = SmtpResponse::sender_ok(address.as_str());
    ctx.transaction.commit_sender(address);

    if let Err(err) = ctx.reply(reply, cancel).await {
        ctx.transaction.sender = None;
        return Err(err);
    }

    debug!("sender accepted");
    Ok(true)
}
