//! OAuth scope lists.
//!
//! Scopes are requested in the authorize URL as a comma-joined list and are
//! reported back by the API when a call needs a grant the app does not hold.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated list of OAuth scopes.
///
/// Order is preserved so the authorize URL lists scopes exactly as the
/// caller requested them.
///
/// # Example
///
/// ```rust
/// use shopify_client::AuthScopes;
///
/// let scopes: AuthScopes = "read_products, write_orders,read_products".parse().unwrap();
/// assert_eq!(scopes.len(), 2);
/// assert_eq!(scopes.to_string(), "read_products,write_orders");
/// assert!(scopes.contains("write_orders"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no scopes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is in the list.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Returns an iterator over the scopes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn push(&mut self, scope: &str) {
        if !self.contains(scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.push(scope);
        }

        Ok(scopes)
    }
}

impl<S: AsRef<str>> FromIterator<S> for AuthScopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut scopes = Self::new();
        for scope in iter {
            let scope = scope.as_ref().trim();
            if !scope.is_empty() {
                scopes.push(scope);
            }
        }
        scopes
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}
