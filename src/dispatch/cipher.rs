//! Password transforms applied to every outbound message.

use crate::dispatch::types::DispatchError;

/// Opaque transform from a wire command to the datagram payload.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, DispatchError>;
}

/// Prepends the shared password to the command text.
///
/// This is what the receiving agent expects on its command port.
#[derive(Debug, Clone)]
pub struct PasswordPrefix {
    password: String,
}

impl PasswordPrefix {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl Cipher for PasswordPrefix {
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, DispatchError> {
        let mut payload = Vec::with_capacity(self.password.len() + plaintext.len());
        payload.extend_from_slice(self.password.as_bytes());
        payload.extend_from_slice(plaintext.as_bytes());
        Ok(payload)
    }
}

/// Sends the command text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl Cipher for Plaintext {
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, DispatchError> {
        Ok(plaintext.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_prepended() {
        let cipher = PasswordPrefix::new("secret");
        assert_eq!(cipher.encrypt("KBP65").unwrap(), b"secretKBP65");
    }

    #[test]
    fn empty_password_is_identity() {
        let cipher = PasswordPrefix::new("");
        assert_eq!(cipher.encrypt("MLC").unwrap(), Plaintext.encrypt("MLC").unwrap());
    }
}
