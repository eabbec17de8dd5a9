//! Security utilities shared by the API crates.
//!
//! ## XML Injection Prevention
//!
//! Every user-provided value placed in a SOAP envelope MUST go through
//! [`xml::escape`]. Values read back out of a response go through
//! [`xml::unescape`].
//!
//! ```rust
//! use busbar_sf_client::security::xml;
//!
//! let member = xml::escape("</members><members>*");
//! let fragment = format!("<members>{}</members>", member);
//! assert!(!fragment.contains("</members><members>*"));
//! ```
//!
//! ## Credential Redaction
//!
//! Text that may echo a request (SOAP faults, HTTP error bodies) is passed
//! through [`redact::sanitize`] before it is stored in an error.

/// XML escaping utilities.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use busbar_sf_client::security::xml;
    ///
    /// let safe = xml::escape("Hello <World> & 'Friends'");
    /// assert_eq!(safe, "Hello &lt;World&gt; &amp; &apos;Friends&apos;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Reverse [`escape`] for text content read from a response.
    ///
    /// Unknown entities are left untouched.
    #[must_use]
    pub fn unescape(value: &str) -> String {
        if !value.contains('&') {
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(idx) = rest.find('&') {
            out.push_str(&rest[..idx]);
            let tail = &rest[idx..];
            let entity = [
                ("&amp;", '&'),
                ("&lt;", '<'),
                ("&gt;", '>'),
                ("&quot;", '"'),
                ("&apos;", '\''),
            ]
            .into_iter()
            .find(|(name, _)| tail.starts_with(name));

            match entity {
                Some((name, ch)) => {
                    out.push(ch);
                    rest = &tail[name.len()..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Instance URL validation.
pub mod url {
    use crate::error::{Error, ErrorKind, Result};

    /// Validate an instance URL and return it without a trailing slash.
    ///
    /// # Example
    ///
    /// ```rust
    /// use busbar_sf_client::security::url;
    ///
    /// let base = url::instance_url("https://na1.salesforce.com/").unwrap();
    /// assert_eq!(base, "https://na1.salesforce.com");
    /// assert!(url::instance_url("na1.salesforce.com").is_err());
    /// ```
    pub fn instance_url(raw: &str) -> Result<String> {
        let parsed = ::url::Url::parse(raw.trim())
            .map_err(|e| Error::with_source(ErrorKind::InvalidUrl(raw.to_string()), e))?;

        if !matches!(parsed.scheme(), "https" | "http") || parsed.host_str().is_none() {
            return Err(Error::new(ErrorKind::InvalidUrl(raw.to_string())));
        }

        Ok(parsed.as_str().trim_end_matches('/').to_string())
    }
}

/// Redaction of credentials in free-form text.
pub mod redact {
    use std::sync::OnceLock;

    const MAX_LENGTH: usize = 500;

    fn token_pattern() -> &'static regex_lite::Regex {
        static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
        // Salesforce access tokens: org id prefix, `!`, opaque tail.
        PATTERN.get_or_init(|| {
            regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}![A-Za-z0-9_.]+")
                .expect("token pattern is valid")
        })
    }

    fn session_pattern() -> &'static regex_lite::Regex {
        static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            regex_lite::Regex::new(r"<sessionId>[^<]*</sessionId>")
                .expect("session pattern is valid")
        })
    }

    /// Remove access tokens and session headers, then truncate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use busbar_sf_client::security::redact;
    ///
    /// let text = redact::sanitize("<sessionId>00Dxx0000001gPL!AQ4AQFake</sessionId>");
    /// assert_eq!(text, "<sessionId>[REDACTED]</sessionId>");
    /// ```
    #[must_use]
    pub fn sanitize(message: &str) -> String {
        let without_sessions =
            session_pattern().replace_all(message, "<sessionId>[REDACTED]</sessionId>");
        let mut sanitized = token_pattern()
            .replace_all(&without_sessions, "[REDACTED_TOKEN]")
            .into_owned();

        if sanitized.len() > MAX_LENGTH {
            let mut cut = MAX_LENGTH;
            while !sanitized.is_char_boundary(cut) {
                cut -= 1;
            }
            sanitized.truncate(cut);
            sanitized.push_str("...[truncated]");
        }

        sanitized
    }
}
