// auth.rs
use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use subtle::ConstantTimeEq;

/// Operator credentials for the results view. Never logged.
#[derive(Clone, Default)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// False when either configured value is empty, whatever is provided.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn authorize(&self, username: &str, password: &str) -> bool {
        if !self.is_configured() {
            return false;
        }

        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());

        bool::from(user_ok & pass_ok)
    }

    /// Checks an `Authorization: Basic ...` header value.
    pub fn authorize_header(&self, header: Option<&str>) -> bool {
        match header.and_then(decode_basic) {
            Some((username, password)) => self.authorize(&username, &password),
            None => false,
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Splits `Basic base64(user:pass)` on the first colon.
pub fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
