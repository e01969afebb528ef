//! Session [`Token`] and its [`Claims`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
#[cfg(doc)]
use common::DateTime;
use common::{unit::Expiration, DateTimeOf};
use derive_more::{AsRef, Display, Error, From};
use serde::{Deserialize, Serialize};

use super::{Id, Identity, Name};

/// Access token of a session, issued by the authentication authority.
///
/// Structurally this is a compact [JWT]: three dot-separated base64url
/// segments (header, claims and signature).
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(AsRef, Clone, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Token(String);

impl Token {
    /// Decodes the [`Claims`] of this [`Token`].
    ///
    /// The signature is __not__ verified and the header is not inspected:
    /// decoded [`Claims`] are provisional client state and must never be used
    /// for authorization decisions.
    ///
    /// # Errors
    ///
    /// With [`MalformedCredential`] if this [`Token`] doesn't consist of three
    /// well-formed segments, or its claims segment is not a valid JSON object
    /// of the expected shape.
    pub fn decode(&self) -> Result<Claims, MalformedCredential> {
        if !Self::has_compact_form(&self.0) {
            return Err(MalformedCredential::Segments);
        }
        let Some(claims) = self.0.split('.').nth(1) else {
            return Err(MalformedCredential::Segments);
        };

        let json = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(MalformedCredential::Encoding)?;
        serde_json::from_slice(&json).map_err(MalformedCredential::Claims)
    }

    /// Checks whether the given `raw` string consists of exactly three
    /// base64url segments with non-empty header and claims.
    fn has_compact_form(raw: &str) -> bool {
        let is_base64url = |s: &str| {
            s.bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        };

        let mut segments = raw.split('.');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(header), Some(claims), Some(signature), None) => {
                !header.is_empty()
                    && !claims.is_empty()
                    && [header, claims, signature].into_iter().all(is_base64url)
            }
            _ => false,
        }
    }

    /// Returns the `Authorization` header value carrying this [`Token`].
    ///
    /// # Errors
    ///
    /// If this [`Token`] contains characters not allowed in HTTP headers.
    pub fn bearer(
        &self,
    ) -> Result<http::HeaderValue, http::header::InvalidHeaderValue> {
        let mut value =
            http::HeaderValue::try_from(format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Claims encoded inside a [`Token`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    /// ID of the user this [`Token`] was issued for.
    #[serde(rename = "sub")]
    pub subject: Id,

    /// Display [`Name`] of the user.
    pub username: Name,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Claims {
    /// Indicates whether these [`Claims`] are expired at the provided `now`.
    ///
    /// A [`Token`] is expired at the very instant of its expiration.
    #[must_use]
    pub fn is_expired(&self, now: ExpirationDateTime) -> bool {
        self.expires_at <= now
    }

    /// Returns the [`Identity`] these [`Claims`] describe.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.subject.clone(),
            username: self.username.clone(),
        }
    }
}

/// [`DateTime`] of a [`Token`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Token, Expiration)>;

/// Error of decoding a [`Token`].
#[derive(Debug, Display, Error)]
pub enum MalformedCredential {
    /// [`Token`] is not made of three base64url segments.
    #[display("`Token` must consist of three base64url segments")]
    Segments,

    /// [`Claims`] segment is not valid base64url.
    #[display("`Token` claims segment is not base64url: {_0}")]
    Encoding(base64::DecodeError),

    /// [`Claims`] segment is not a JSON object of the expected shape.
    #[display("Failed to parse `Token` claims: {_0}")]
    Claims(serde_json::Error),
}
