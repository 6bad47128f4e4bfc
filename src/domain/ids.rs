//! Domain identifier types with validation
//!
//! Newtype wrappers for record and artifact identifiers. Each type ensures
//! type safety and validates its format on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customer identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use helpdesk_export::domain::ids::CustomerId;
///
/// let id = CustomerId::new(42).unwrap();
/// assert_eq!(id.get(), 42);
/// assert!(CustomerId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CustomerId(u64);

impl CustomerId {
    /// Creates a new CustomerId, rejecting zero
    pub fn new(id: u64) -> Result<Self, String> {
        if id == 0 {
            return Err("Customer ID must be greater than zero".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for CustomerId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CustomerId> for u64 {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket identifier newtype wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TicketId(u64);

impl TicketId {
    /// Creates a new TicketId, rejecting zero
    pub fn new(id: u64) -> Result<Self, String> {
        if id == 0 {
            return Err("Ticket ID must be greater than zero".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for TicketId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketId> for u64 {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifact key newtype wrapper
///
/// Identifies the output artifact of one batch job. It is always 32 lowercase
/// hex characters, which keeps it safe to use as a file name component.
///
/// # Examples
///
/// ```
/// use helpdesk_export::domain::ids::ArtifactKey;
/// use std::str::FromStr;
///
/// let key = ArtifactKey::from_str("0123456789abcdef0123456789abcdef").unwrap();
/// assert_eq!(key.as_str().len(), 32);
/// assert!(ArtifactKey::from_str("../../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Length of a key in hex characters
    pub const LEN: usize = 32;

    /// Creates a new ArtifactKey from a string
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.len() != Self::LEN {
            return Err(format!(
                "Artifact key must be {} characters, got {}",
                Self::LEN,
                key.len()
            ));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err("Artifact key must be lowercase hex".to_string());
        }
        Ok(Self(key))
    }

    /// Builds a key from a digest: the first [`Self::LEN`] hex characters
    pub fn from_digest(digest: &[u8]) -> Self {
        let mut hex = hex::encode(digest);
        hex.truncate(Self::LEN);
        Self(hex)
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ArtifactKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
