//! Settings model types.

use serde::{Deserialize, Serialize};

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (rejected by the delivery transport).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// Outbound SMTP server settings, immutable per delivery attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 465 for TLS, 587 for STARTTLS).
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl ConnectionSettings {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        match security {
            Security::None => 25,
            Security::StartTls => 587,
            Security::Tls => 465,
        }
    }

    /// Create settings with common defaults for well-known providers.
    ///
    /// The username is prefilled with the address; unknown domains get an
    /// empty host that the caller must fill in.
    #[must_use]
    pub fn for_address(email: &str) -> Self {
        let mut settings = Self {
            username: email.to_string(),
            ..Self::default()
        };

        // Auto-detect provider settings
        if let Some(domain) = email.split('@').nth(1) {
            match domain.to_lowercase().as_str() {
                "gmail.com" | "googlemail.com" => {
                    settings.host = "smtp.gmail.com".to_string();
                    settings.port = 465;
                    settings.security = Security::Tls;
                }
                "outlook.com" | "hotmail.com" | "live.com" => {
                    settings.host = "smtp.office365.com".to_string();
                    settings.port = 587;
                    settings.security = Security::StartTls;
                }
                "yahoo.com" => {
                    settings.host = "smtp.mail.yahoo.com".to_string();
                    settings.port = 465;
                    settings.security = Security::Tls;
                }
                "icloud.com" | "me.com" => {
                    settings.host = "smtp.mail.me.com".to_string();
                    settings.port = 587;
                    settings.security = Security::StartTls;
                }
                _ => {}
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(ConnectionSettings::default_port(Security::Tls), 465);
        assert_eq!(ConnectionSettings::default_port(Security::StartTls), 587);
        assert_eq!(ConnectionSettings::default_port(Security::None), 25);
    }

    #[test]
    fn test_gmail_preset() {
        let settings = ConnectionSettings::for_address("author@gmail.com");
        assert_eq!(settings.host, "smtp.gmail.com");
        assert_eq!(settings.port, 465);
        assert_eq!(settings.security, Security::Tls);
        assert_eq!(settings.username, "author@gmail.com");
    }

    #[test]
    fn test_outlook_preset_uses_starttls() {
        let settings = ConnectionSettings::for_address("author@outlook.com");
        assert_eq!(settings.host, "smtp.office365.com");
        assert_eq!(settings.security, Security::StartTls);
    }

    #[test]
    fn test_unknown_domain_left_blank() {
        let settings = ConnectionSettings::for_address("author@example.org");
        assert!(settings.host.is_empty());
        assert_eq!(settings.username, "author@example.org");
    }
}
