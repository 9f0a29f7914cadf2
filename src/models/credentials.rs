use std::fmt;

/// OAuth2 client-credentials pair for the upstream token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &mask_secret(&self.client_secret))
            .finish()
    }
}

/// Keep the first five characters, enough to tell keys apart in logs
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "missing".to_string();
    }
    format!("{}...", secret.chars().take(5).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("qkMLPpXf20tz"), "qkMLP...");
        assert_eq!(mask_secret("abc"), "abc...");
        assert_eq!(mask_secret(""), "missing");
    }

    #[test]
    fn test_debug_does_not_leak() {
        let creds = ClientCredentials::new("client-id-value", "very-secret-value");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("very-secret-value"));
        assert!(rendered.contains("very-..."));
    }
}
