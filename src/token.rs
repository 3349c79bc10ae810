//! Issued token types and freshness normalization for externally-supplied tokens.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping signed material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Signed attestation token plus its trusted issuance instant.
///
/// Immutable once constructed; downstream freshness checks rely on `issued_at` never
/// changing after issuance.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
	secret: TokenSecret,
	issued_at: OffsetDateTime,
}
impl Token {
	/// Creates a token stamped with the provided issuance instant.
	pub fn new(value: impl Into<String>, issued_at: OffsetDateTime) -> Self {
		Self { secret: TokenSecret::new(value), issued_at }
	}

	/// Creates a token stamped with the current clock.
	pub fn issued_now(value: impl Into<String>) -> Self {
		Self::new(value, OffsetDateTime::now_utc())
	}

	/// Wraps an externally-issued token, deriving a trustworthy issuance instant from the
	/// embedded `iat` claim.
	///
	/// Callers may reuse a previously-issued token (embedding a real past issuance time) or
	/// issue a fresh one with no embedded time at all. The claim is trusted only when it is
	/// present, strictly positive, and strictly in the past; anything else — a missing claim,
	/// a zero or negative value, a clock-skewed future instant — is replaced with the current
	/// time.
	pub fn normalized(value: impl Into<String>) -> Self {
		Self::normalized_at(value, OffsetDateTime::now_utc())
	}

	/// Clock-injectable variant of [`Token::normalized`].
	pub fn normalized_at(value: impl Into<String>, now: OffsetDateTime) -> Self {
		let value = value.into();
		let issued_at = match embedded_issued_at(&value) {
			Some(iat) if iat > 0 && iat < now.unix_timestamp() =>
				OffsetDateTime::from_unix_timestamp(iat).unwrap_or(now),
			_ => now,
		};

		Self { secret: TokenSecret::new(value), issued_at }
	}

	/// Returns the signed token material.
	pub fn secret(&self) -> &TokenSecret {
		&self.secret
	}

	/// Returns the trusted issuance instant.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Returns the issuance instant as milliseconds since the Unix epoch.
	pub fn issued_at_millis(&self) -> i64 {
		(self.issued_at.unix_timestamp_nanos() / 1_000_000) as i64
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Extracts the `iat` claim (seconds since epoch) from a JWT-shaped token.
///
/// Returns `None` for tokens that are not three dot-separated segments, carry an
/// undecodable payload, or omit the claim.
fn embedded_issued_at(token: &str) -> Option<i64> {
	let mut segments = token.split('.');
	let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some(_), Some(payload), Some(_), None) => payload,
		_ => return None,
	};
	// Issuers vary on padding; strip it before the no-pad decode.
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
	let claims: Claims = serde_json::from_slice(&bytes).ok()?;

	claims.iat
}

#[derive(Deserialize)]
struct Claims {
	iat: Option<i64>,
}
