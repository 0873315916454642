use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// RFC 5321 section 4.5.3.1 length limits, in bytes.
const MAX_LOCAL_PART: usize = 64;
const MAX_DOMAIN: usize = 255;
const MAX_PATH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is missing '@'")]
    MissingAt,
    #[error("address has an empty local-part")]
    EmptyLocalPart,
    #[error("address has an empty domain")]
    EmptyDomain,
    #[error("local-part exceeds 64 bytes")]
    LocalPartTooLong,
    #[error("domain exceeds 255 bytes")]
    DomainTooLong,
    #[error("path exceeds 256 bytes")]
    PathTooLong,
    #[error("address contains whitespace or angle brackets")]
    InvalidCharacter,
}

/// A validated reverse-path. The empty mailbox is the null sender (`<>`)
/// used for bounces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(String);

impl Mailbox {
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        if address.is_empty() {
            return Ok(Self::null());
        }
        // Two angle brackets count towards the path limit.
        if address.len() + 2 > MAX_PATH {
            return Err(AddressError::PathTooLong);
        }
        if address
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>')
        {
            return Err(AddressError::InvalidCharacter);
        }

        let (local, domain) = address.rsplit_once('@').ok_or(AddressError::MissingAt)?;
        if local.is_empty() {
            return Err(AddressError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(AddressError::EmptyDomain);
        }
        if local.len() > MAX_LOCAL_PART {
            return Err(AddressError::LocalPartTooLong);
        }
        if domain.len() > MAX_DOMAIN {
            return Err(AddressError::DomainTooLong);
        }

        Ok(Self(address.to_string()))
    }

    pub fn null() -> Self {
        Self(String::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part, `None` for the null sender.
    pub fn domain(&self) -> Option<&str> {
        self.0.rsplit_once('@').map(|(_, domain)| domain)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// MAIL FROM extension parameters (`SIZE=1024`, `BODY=8BITMIME`, ...).
///
/// Names are case-insensitive and stored upper-cased. Keyword-only
/// parameters such as `SMTPUTF8` carry an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailParameters {
    values: HashMap<String, String>,
}

impl MailParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_ascii_uppercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Client-declared message size. A missing or unparsable `SIZE`
    /// counts as 0, the same as "not declared". A well-formed number too
    /// large for `u64` saturates, so it still trips any size limit.
    pub fn declared_size(&self) -> u64 {
        let Some(value) = self.get("SIZE") else {
            return 0;
        };
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return 0;
        }
        value.parse::<u64>().unwrap_or(u64::MAX)
    }
}

impl<K, V> FromIterator<(K, V)> for MailParameters
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Self::new();
        for (name, value) in iter {
            parameters.insert(name.as_ref(), value);
        }
        parameters
    }
}

/// Mail transaction data
#[derive(Debug, Clone, Default)]
pub struct MailTransaction {
    /// Reverse path, set once MAIL FROM is accepted
    pub sender: Option<Mailbox>,
    /// MAIL FROM parameters of the current attempt
    pub parameters: MailParameters,
    /// Forward paths (RCPT TO addresses)
    pub recipients: Vec<Mailbox>,
}

impl MailTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start a new attempt: drop everything from the previous one and
    /// install the new parameters.
    pub fn begin(&mut self, parameters: MailParameters) {
        *self = Self {
            parameters,
            ..Self::default()
        };
    }

    pub fn commit_sender(&mut self, sender: Mailbox) {
        self.sender = Some(sender);
    }

    pub fn add_recipient(&mut self, recipient: Mailbox) {
        self.recipients.push(recipient);
    }

    pub fn has_sender(&self) -> bool {
        self.sender.is_some()
    }

    pub fn has_recipients(&self) -> bool {
        !self.recipients.is_empty()
    }
}
