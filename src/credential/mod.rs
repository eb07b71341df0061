//! In-memory holder for the provider API key
//!
//! The key lives only for the duration of the process. It is never written
//! to the config file and is wiped from memory when replaced or dropped.

use std::fmt;
use zeroize::Zeroizing;

/// Session-scoped API credential
#[derive(Clone, Default)]
pub struct Credential {
    secret: Zeroizing<String>,
}

impl Credential {
    /// An empty credential
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Current value, possibly empty
    pub fn get(&self) -> &str {
        self.secret.as_str()
    }

    /// Overwrite the held value
    pub fn set(&mut self, value: impl Into<String>) {
        // Dropping the old Zeroizing wipes the previous key
        self.secret = Zeroizing::new(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    /// Short form safe for display, e.g. `sk-o...f3a9`
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.secret.chars().collect();
        match chars.len() {
            0 => "(not set)".to_string(),
            n if n <= 8 => "*".repeat(n),
            n => {
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[n - 4..].iter().collect();
                format!("{}...{}", head, tail)
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("set", &!self.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let credential = Credential::new();
        assert!(credential.is_empty());
        assert_eq!(credential.get(), "");
        assert_eq!(credential.masked(), "(not set)");
    }

    #[test]
    fn test_set_overwrites() {
        let mut credential = Credential::new();
        credential.set("sk-first");
        credential.set("sk-or-v1-abcdef123456");
        assert_eq!(credential.get(), "sk-or-v1-abcdef123456");
        assert_eq!(credential.masked(), "sk-o...3456");
    }

    #[test]
    fn test_debug_hides_secret() {
        let credential = Credential::from_secret("sk-test");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("set: true"));
    }
}
