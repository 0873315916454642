//! Sender filter contracts.
//!
//! A [`MailboxFilterFactory`] lives in the server policy and hands out one
//! fresh [`MailboxFilter`] per MAIL FROM. The filter makes a single
//! decision and is dropped before the command returns, whatever the
//! outcome, so anything it holds (connections, leases) is released then.

use super::cancel::Cancellation;
use super::transaction::Mailbox;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Verdict of a filter on a proposed sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    RejectTemporary,
    RejectPermanent,
    SizeLimitExceeded,
}

impl FilterDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::RejectTemporary => "reject-temporary",
            Self::RejectPermanent => "reject-permanent",
            Self::SizeLimitExceeded => "size-limit-exceeded",
        }
    }
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses verdicts relayed as text by external policy services.
impl FromStr for FilterDecision {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject-temporary" => Ok(Self::RejectTemporary),
            "reject-permanent" => Ok(Self::RejectPermanent),
            "size-limit-exceeded" => Ok(Self::SizeLimitExceeded),
            _ => Err(FilterError::UnrecognizedDecision(s.to_string())),
        }
    }
}

/// A filter broke its contract and produced no usable decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unrecognized filter decision: {0:?}")]
    UnrecognizedDecision(String),
    #[error("filter failed: {0}")]
    Failed(String),
}

/// Read-only view of the session handed to filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub endpoint: &'a str,
    pub remote_addr: &'a str,
    /// HELO/EHLO identity, empty if the client has not greeted
    pub client_id: &'a str,
    pub authenticated_user: Option<&'a str>,
}

#[async_trait]
pub trait MailboxFilter: Send {
    /// Decide whether `sender` may open a transaction for a message of
    /// `declared_size` bytes (0 when the client declared nothing).
    async fn decide(
        &mut self,
        ctx: &FilterContext<'_>,
        sender: &Mailbox,
        declared_size: u64,
        cancel: &Cancellation,
    ) -> Result<FilterDecision, FilterError>;
}

/// Produces one filter per command. Implementations must not hand out a
/// shared or cached instance.
pub trait MailboxFilterFactory: Send + Sync {
    fn create(&self, ctx: &FilterContext<'_>) -> Box<dyn MailboxFilter>;
}

/// Factory whose filters accept every sender.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilters;

struct AcceptAll;

#[async_trait]
impl MailboxFilter for AcceptAll {
    async fn decide(
        &mut self,
        _ctx: &FilterContext<'_>,
        _sender: &Mailbox,
        _declared_size: u64,
        _cancel: &Cancellation,
    ) -> Result<FilterDecision, FilterError> {
        Ok(FilterDecision::Accept)
    }
}

impl MailboxFilterFactory for AcceptAllFilters {
    fn create(&self, _ctx: &FilterContext<'_>) -> Box<dyn MailboxFilter> {
        Box::new(AcceptAll)
    }
}
