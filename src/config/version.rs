//! Admin API version handling.
//!
//! Shopify releases a stable API version every quarter, named after the
//! release month (`2025-01`, `2025-04`, `2025-07`, `2025-10`, ...), plus a
//! rolling `unstable` version.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A Shopify Admin API version.
///
/// Versions order chronologically; `Unstable` sorts after every release.
///
/// # Example
///
/// ```rust
/// use shopify_client::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::Release { year: 2024, month: 10 });
/// assert_eq!(version.to_string(), "2024-10");
/// assert!(version < ApiVersion::latest());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    /// A quarterly stable release.
    Release {
        /// Four digit release year.
        year: u16,
        /// Release month: 1, 4, 7 or 10.
        month: u8,
    },
    /// The rolling development version.
    Unstable,
}

impl ApiVersion {
    const RELEASE_MONTHS: [u8; 4] = [1, 4, 7, 10];

    /// Returns the newest stable version this crate has been tested against.
    #[must_use]
    pub const fn latest() -> Self {
        Self::Release {
            year: 2025,
            month: 10,
        }
    }

    /// Returns `true` for quarterly releases.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        matches!(self, Self::Release { .. })
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Unstable => f.write_str("unstable"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "unstable" {
            return Ok(Self::Unstable);
        }

        let invalid = || ConfigError::InvalidApiVersion { version: s.clone() };

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        if !Self::RELEASE_MONTHS.contains(&month) {
            return Err(invalid());
        }

        Ok(Self::Release { year, month })
    }
}
