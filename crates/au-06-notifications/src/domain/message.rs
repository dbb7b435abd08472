//! Outgoing email

use crate::error::{NotificationError, NotificationResult};
use serde::{Deserialize, Serialize};

/// A rendered email, ready for a [`Mailer`](crate::ports::Mailer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl EmailMessage {
    pub fn validate(&self) -> NotificationResult<()> {
        if self.to.is_empty() || self.to.iter().any(|t| t.trim().is_empty()) {
            return Err(NotificationError::InvalidMessage("no recipient".into()));
        }
        if self.subject.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("empty subject".into()));
        }
        Ok(())
    }
}

/// Escape text for interpolation into HTML element content or
/// double-quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b onclick="x">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_validate_requires_recipient_and_subject() {
        let mut message = EmailMessage {
            to: vec![],
            subject: "Hi".into(),
            html: String::new(),
            text: String::new(),
            reply_to: None,
        };
        assert!(message.validate().is_err());
        message.to.push("a@example.com".into());
        assert!(message.validate().is_ok());
        message.subject = "  ".into();
        assert!(message.validate().is_err());
    }
}
