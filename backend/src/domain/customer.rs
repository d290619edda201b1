//! Customer identifier used as the partition key of every document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`CustomerId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdValidationError {
    Empty,
    SurroundingWhitespace,
}

impl fmt::Display for CustomerIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "customer id must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "customer id must not start or end with whitespace")
            }
        }
    }
}

impl std::error::Error for CustomerIdValidationError {}

/// Partition key of the customer documents.
///
/// # Examples
/// ```
/// use switchgear_pm::domain::CustomerId;
///
/// let id = CustomerId::new("CUST-1").expect("valid id");
/// assert_eq!(id.as_ref(), "CUST-1");
/// assert!(CustomerId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Result<Self, CustomerIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CustomerIdValidationError::Empty);
        }
        if id.trim() != id {
            return Err(CustomerIdValidationError::SurroundingWhitespace);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CustomerIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CustomerId> for String {
    fn from(value: CustomerId) -> Self {
        value.0
    }
}
