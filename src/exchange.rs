//! Exchange transport contracts trading attestation artifacts for signed tokens.
//!
//! [`TokenExchanger`] is the crate's only seam onto an HTTP stack. Failure
//! classification happens here, at the boundary where the raw failure is received:
//! only [`ExchangeError::Status`] rejections feed the throttle state machine, while
//! transport and parse failures propagate to callers verbatim.

#[cfg(feature = "reqwest")] use reqwest::header::CONTENT_TYPE;
// self
use crate::{_prelude::*, app::AppContext, attest::Artifact, token::Token};

type BoxError = Box<dyn StdError + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Boxed future returned by [`TokenExchanger::exchange`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Token, ExchangeError>> + 'a + Send>>;

/// Abstraction over transports that submit artifacts to a verification service.
///
/// Implementations clone whatever they need from `app` and `artifact` before entering
/// their async block; the future may borrow the exchanger but not the arguments.
pub trait TokenExchanger
where
	Self: Send + Sync,
{
	/// Exchanges the artifact for a signed token on behalf of the app.
	fn exchange(&self, app: &AppContext, artifact: &Artifact) -> ExchangeFuture<'_>;
}

/// Classified exchange failure raised by [`TokenExchanger`] implementations.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Verification service rejected the exchange with an HTTP status code.
	#[error("Verification service rejected the exchange with HTTP status {http_status}.")]
	Status {
		/// Status code returned by the verification service.
		http_status: u16,
		/// Truncated response body for diagnostics, when one was returned.
		body_preview: Option<String>,
	},
	/// Verification service returned malformed JSON.
	#[error("Verification service returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the verification service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the verification service.")]
	Io(#[from] std::io::Error),
}
impl ExchangeError {
	/// Builds a status rejection, attaching a truncated body preview when non-empty.
	pub fn status(http_status: u16, body: impl AsRef<[u8]>) -> Self {
		let preview = String::from_utf8_lossy(body.as_ref()).into_owned();
		let body_preview = (!preview.trim().is_empty()).then(|| truncate_preview(preview));

		Self::Status { http_status, body_preview }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Status code for failures that should open a throttle window.
	///
	/// Transport and parse failures never do; they carry no verdict from the
	/// verification service.
	pub fn throttle_status(&self) -> Option<u16> {
		match self {
			Self::Status { http_status, .. } => Some(*http_status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ExchangeError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

/// Reqwest-backed exchanger posting artifacts to a verification endpoint.
///
/// Token requests should not follow redirects; verification endpoints return results
/// directly instead of delegating to another URI. Configure any custom
/// [`ReqwestClient`] passed to [`with_client`](HttpExchanger::with_client) to disable
/// redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct HttpExchanger {
	client: ReqwestClient,
	endpoint: Url,
}
#[cfg(feature = "reqwest")]
impl HttpExchanger {
	/// Creates an exchanger with a default reqwest client for the provided endpoint.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::default(), endpoint)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	/// Returns the configured verification endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}
#[cfg(feature = "reqwest")]
impl TokenExchanger for HttpExchanger {
	fn exchange(&self, app: &AppContext, artifact: &Artifact) -> ExchangeFuture<'_> {
		let client = self.client.clone();
		let endpoint = self.endpoint.clone();
		let body = serde_json::json!({
			"app": app.name().as_ref(),
			"artifact": artifact.expose(),
		})
		.to_string();

		Box::pin(async move {
			let response = client
				.post(endpoint)
				.header(CONTENT_TYPE, "application/json")
				.body(body)
				.send()
				.await
				.map_err(ExchangeError::from)?;
			let status = response.status();
			let bytes = response.bytes().await.map_err(ExchangeError::from)?;

			if !status.is_success() {
				return Err(ExchangeError::status(status.as_u16(), &bytes));
			}

			let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
			let payload: ExchangeResponse = serde_path_to_error::deserialize(deserializer)
				.map_err(|source| ExchangeError::ResponseParse { source })?;

			Ok(Token::issued_now(payload.token))
		})
	}
}

/// Correctness-relevant subset of the verification service's response.
#[cfg(feature = "reqwest")]
#[derive(Deserialize)]
struct ExchangeResponse {
	token: String,
}
