//! Customer phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a character that is neither a digit nor a
    /// recognized separator.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The country or trunk prefix is not a Russian one.
    #[error("phone number must start with +7, 7 or 8")]
    UnsupportedPrefix,
    /// The number of significant digits is wrong.
    #[error("phone number must have 10 national digits, got {found}")]
    WrongLength {
        /// Number of digits found after the prefix.
        found: usize,
    },
}

/// A Russian phone number, normalized to E.164 form (`+7XXXXXXXXXX`).
///
/// Customers type numbers every way imaginable, so the parser strips
/// separators and accepts the common national spellings before normalizing.
///
/// ## Accepted inputs
///
/// - `+7 903 123-45-67` (international)
/// - `8(903)1234567` (national with trunk `8`)
/// - `79031234567` (international without `+`)
/// - `9031234567` (bare 10-digit national number)
///
/// ## Examples
///
/// ```
/// use foodcart_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("8 (903) 123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+79031234567");
///
/// assert!(PhoneNumber::parse("+1 555 0100").is_err()); // not a RU number
/// assert!(PhoneNumber::parse("12345").is_err());       // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of significant digits after the country code.
    pub const NATIONAL_DIGITS: usize = 10;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains characters other than digits, `+` and separators
    /// - Does not carry a Russian prefix (`+7`, `7` or `8`)
    /// - Does not have exactly 10 national digits
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let mut digits = String::with_capacity(trimmed.len());
        let mut international = false;
        for (pos, ch) in trimmed.chars().enumerate() {
            match ch {
                '0'..='9' => digits.push(ch),
                '+' if pos == 0 => international = true,
                ' ' | '-' | '(' | ')' => {}
                other => return Err(PhoneNumberError::InvalidCharacter(other)),
            }
        }

        let national = if international {
            let rest = digits
                .strip_prefix('7')
                .ok_or(PhoneNumberError::UnsupportedPrefix)?;
            rest.to_owned()
        } else if digits.len() == Self::NATIONAL_DIGITS + 1 {
            digits
                .strip_prefix(['7', '8'])
                .ok_or(PhoneNumberError::UnsupportedPrefix)?
                .to_owned()
        } else {
            digits
        };

        if national.len() != Self::NATIONAL_DIGITS {
            return Err(PhoneNumberError::WrongLength {
                found: national.len(),
            });
        }

        Ok(Self(format!("+7{national}")))
    }

    /// Returns the normalized E.164 number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Formats the number the way the staff panel prints it:
    /// `8(XXX)XXX-XX-XX`.
    #[must_use]
    pub fn national_display(&self) -> String {
        let national = self.0.get(2..).unwrap_or("");
        format!(
            "8({}){}-{}-{}",
            national.get(..3).unwrap_or(""),
            national.get(3..6).unwrap_or(""),
            national.get(6..8).unwrap_or(""),
            national.get(8..).unwrap_or("")
        )
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
