use std::fmt;

/// SMTP reply codes and messages according to RFC 5321
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpResponse {
    pub code: u16,
    pub message: String,
}

impl SmtpResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Format response for transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }

    /// 2xx - the requested action completed
    pub fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 4xx - the client may retry the same command later
    pub fn is_transient(&self) -> bool {
        (400..500).contains(&self.code)
    }

    /// 5xx - retrying the same command will fail again
    pub fn is_permanent(&self) -> bool {
        (500..600).contains(&self.code)
    }

    // === MAIL FROM responses ===

    /// 250 - Sender accepted
    pub fn sender_ok(mailbox: &str) -> Self {
        Self::new(250, format!("2.1.0 Sender <{}> OK", mailbox))
    }

    /// 450 - Mailbox unavailable (temporary)
    pub fn mailbox_unavailable_temp(mailbox: &str) -> Self {
        Self::new(
            450,
            format!("4.2.0 Requested mail action not taken: mailbox <{}> unavailable", mailbox),
        )
    }

    /// 530 - Authentication required
    pub fn auth_required() -> Self {
        Self::new(530, "5.7.0 Authentication required")
    }

    /// 552 - Exceeded storage allocation
    pub fn size_exceeded() -> Self {
        Self::new(552, "5.3.4 Message size exceeds fixed maximum message size")
    }

    /// 553 - Mailbox name not allowed
    pub fn mailbox_name_not_allowed() -> Self {
        Self::new(553, "5.7.1 Requested action not taken: mailbox name not allowed")
    }

    /// 554 - Transaction failed
    pub fn transaction_failed() -> Self {
        Self::new(554, "5.3.0 Transaction failed")
    }
}

impl fmt::Display for SmtpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}
