//! Validated newtype wrappers for credentials and the shop domain.
//!
//! Credentials are checked for emptiness on construction. Values that must
//! never reach a log line (password, shared secret, access token) print as
//! `Name(*****)` in `Debug` output.

use crate::error::ConfigError;
use std::fmt;

/// A validated Shopify API key.
///
/// The API key is public: it is sent as the URL user name in direct-auth
/// mode and as `client_id` during OAuth.
///
/// # Example
///
/// ```rust
/// use shopify_client::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

macro_rules! secret_newtype {
    ($(#[$meta:meta])* $name:ident, $empty:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new validated `", stringify!($name), "`.")]
            ///
            /// # Errors
            ///
            #[doc = concat!("Returns [`ConfigError::", stringify!($empty), "`] if the value is empty.")]
            pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ConfigError::$empty);
                }
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(*****)"))
            }
        }
    };
}

secret_newtype!(
    /// The password issued to a private app alongside its API key.
    ///
    /// Embedded in the base URL as the user-info password in direct-auth mode.
    ///
    /// ```rust
    /// use shopify_client::ApiPassword;
    ///
    /// let password = ApiPassword::new("shppa_123").unwrap();
    /// assert_eq!(format!("{:?}", password), "ApiPassword(*****)");
    /// ```
    ApiPassword,
    EmptyApiPassword
);

secret_newtype!(
    /// The app's shared secret.
    ///
    /// Only ever used as an HMAC key. It is never transmitted.
    ///
    /// ```rust
    /// use shopify_client::ApiSecretKey;
    ///
    /// let secret = ApiSecretKey::new("my-secret").unwrap();
    /// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
    /// ```
    ApiSecretKey,
    EmptyApiSecretKey
);

secret_newtype!(
    /// An OAuth-issued access token, sent as `X-Shopify-Access-Token`.
    AccessToken,
    EmptyAccessToken
);

/// A validated Shopify shop domain.
///
/// Short names are normalized to the full `shop.myshopify.com` form.
///
/// # Example
///
/// ```rust
/// use shopify_client::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// let domain = ShopDomain::new("https://My-Store.myshopify.com/").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// A leading `http://`/`https://` scheme and trailing slashes are
    /// tolerated, since shop URLs are often copied from a browser.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();
        let bare = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(&domain)
            .trim_end_matches('/');

        if bare.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        let shop_name = match bare.strip_suffix(Self::SUFFIX) {
            Some(name) => name,
            None if bare.contains('.') => {
                return Err(ConfigError::InvalidShopDomain { domain });
            }
            None => bare,
        };

        if !Self::is_valid_shop_name(shop_name) {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain: format!("{shop_name}{}", Self::SUFFIX),
        })
    }

    /// Returns the shop name portion of the domain.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_shop_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}
