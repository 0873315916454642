//! SMTP transaction handling according to RFC 5321

mod cancel;
mod error;
pub mod filter;
mod mail_from;
mod reply;
mod response;
mod session;
mod transaction;

pub use cancel::{cancellation, CancelHandle, Cancellation, Cancelled};
pub use error::CommandError;
pub use filter::{
    AcceptAllFilters, FilterContext, FilterDecision, FilterError, MailboxFilter,
    MailboxFilterFactory,
};
pub use mail_from::{MailFromCommand, MailFromExecutor};
pub use reply::{ReplyChannel, ReplyError, StreamReplyChannel};
pub use response::SmtpResponse;
pub use session::{SessionContext, SmtpSession, SmtpState};
pub use transaction::{AddressError, MailParameters, MailTransaction, Mailbox};
