// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use http::{Method, Request, Response, header::AUTHORIZATION};
use serde_json::json;
// self
use bearer_client::{
	_preludet::*,
	client::{BearerClient, RequestOptions},
	error::RefreshError,
	source::{SourceFuture, TokenSource},
	token::{BearerToken, HeldToken},
	transport::{ApiTransport, TransportFuture},
};

/// Fake refresh collaborator that counts round trips and issues `issued-{n}` tokens.
struct CountingSource {
	calls: AtomicU64,
	delay: std::time::Duration,
	fail: bool,
}
impl CountingSource {
	fn succeeding(delay: std::time::Duration) -> Self {
		Self { calls: AtomicU64::new(0), delay, fail: false }
	}

	fn failing() -> Self {
		Self { calls: AtomicU64::new(0), delay: std::time::Duration::ZERO, fail: true }
	}

	fn calls(&self) -> u64 {
		self.calls.load(Ordering::Relaxed)
	}
}
impl TokenSource for CountingSource {
	fn issue(&self) -> SourceFuture<'_> {
		Box::pin(async move {
			let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;

			tokio::time::sleep(self.delay).await;

			if self.fail {
				return Err(RefreshError::TokenEndpoint {
					message: "Issuer offline.".into(),
					status: Some(503),
				});
			}

			Ok(BearerToken::new(
				format!("issued-{call}"),
				OffsetDateTime::now_utc() + Duration::hours(1),
			))
		})
	}
}

/// Fake transport that records the `Authorization` header of every dispatched request.
#[derive(Clone, Default)]
struct RecordingTransport {
	authorization: Arc<Mutex<Vec<Option<String>>>>,
}
impl RecordingTransport {
	fn seen(&self) -> Vec<Option<String>> {
		self.authorization.lock().clone()
	}
}
impl ApiTransport for RecordingTransport {
	fn execute(&self, request: Request<Vec<u8>>) -> TransportFuture<'_> {
		let header = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);

		self.authorization.lock().push(header);

		Box::pin(async move { Ok(Response::new(Vec::new())) })
	}
}

fn build_client(
	transport: RecordingTransport,
	source: Arc<CountingSource>,
) -> BearerClient<RecordingTransport, CountingSource> {
	let base_url =
		Url::parse("https://api.example.com/").expect("Base URL fixture should parse.");

	BearerClient::with_transport(base_url, transport, source)
}

#[tokio::test]
async fn concurrent_dispatches_share_one_refresh() {
	let source = Arc::new(CountingSource::succeeding(std::time::Duration::from_millis(50)));
	let transport = RecordingTransport::default();
	let client = build_client(transport.clone(), source.clone());
	let options = RequestOptions::new().api();
	let (first, second, third) = tokio::join!(
		client.request(Method::GET, "/me", options.clone()),
		client.request(Method::GET, "/me", options.clone()),
		client.request(Method::GET, "/me", options),
	);

	first.expect("First concurrent dispatch should succeed.");
	second.expect("Second concurrent dispatch should succeed.");
	third.expect("Third concurrent dispatch should succeed.");

	assert_eq!(source.calls(), 1, "Concurrent callers must share one refresh round trip.");

	let seen = transport.seen();

	assert_eq!(seen.len(), 3);
	assert!(seen.iter().all(|auth| auth.as_deref() == Some("Bearer issued-1")));
	assert_eq!(client.gate_metrics.refreshes(), 1);
	assert_eq!(client.gate_metrics.reuses(), 2);
}

#[tokio::test]
async fn gate_reuses_unexpired_token_without_contacting_source() {
	let source = Arc::new(CountingSource::succeeding(std::time::Duration::ZERO));
	let transport = RecordingTransport::default();
	let client = build_client(transport.clone(), source.clone()).with_held_token(
		HeldToken::Genuine(BearerToken::new("ok", OffsetDateTime::now_utc() + Duration::hours(1))),
	);
	let token = client.ensure_fresh().await.expect("Gate should pass with a valid held token.");

	assert_eq!(token.access_token().expose(), "ok");
	assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn non_api_dispatch_carries_no_credential() {
	let source = Arc::new(CountingSource::succeeding(std::time::Duration::ZERO));
	let transport = RecordingTransport::default();
	let client = build_client(transport.clone(), source.clone()).with_held_token(
		HeldToken::Genuine(BearerToken::new("ok", OffsetDateTime::now_utc() + Duration::hours(1))),
	);

	client
		.request(Method::GET, "/public", RequestOptions::new())
		.await
		.expect("Unauthenticated dispatch should succeed.");

	assert_eq!(transport.seen(), vec![None]);
	assert_eq!(client.gate_metrics.gates(), 0);
	assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn malformed_held_value_refreshes_through_the_gate() {
	let source = Arc::new(CountingSource::succeeding(std::time::Duration::ZERO));
	let transport = RecordingTransport::default();
	let client = build_client(transport.clone(), source.clone()).with_held_token(
		HeldToken::from_untrusted(json!({"accessToken": "stale", "expiresAt": 0})),
	);

	client
		.request(Method::GET, "/me", RequestOptions::new().api())
		.await
		.expect("Dispatch over a malformed held value should refresh then succeed.");

	assert_eq!(source.calls(), 1);
	assert_eq!(transport.seen(), vec![Some("Bearer issued-1".into())]);
}

#[tokio::test]
async fn refresh_failure_surfaces_to_every_waiter() {
	let source = Arc::new(CountingSource::failing());
	let transport = RecordingTransport::default();
	let client = build_client(transport.clone(), source.clone());
	let options = RequestOptions::new().api();
	let (first, second, third) = tokio::join!(
		client.request(Method::GET, "/me", options.clone()),
		client.request(Method::GET, "/me", options.clone()),
		client.request(Method::GET, "/me", options),
	);

	for result in [first, second, third] {
		let err = result.expect_err("Every waiter must observe the refresh failure.");

		assert!(matches!(err, Error::RefreshFailed(_)));
	}

	// No caller dispatched with a missing credential, and the holder is untouched.
	assert!(transport.seen().is_empty());
	assert!(matches!(client.held_token(), HeldToken::Absent));
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_token() {
	let source = Arc::new(CountingSource::failing());
	let transport = RecordingTransport::default();
	let stale = BearerToken::new("stale", OffsetDateTime::now_utc() - Duration::seconds(1));
	let client = build_client(transport.clone(), source.clone())
		.with_held_token(HeldToken::Genuine(stale.clone()));
	let err = client
		.request(Method::GET, "/me", RequestOptions::new().api())
		.await
		.expect_err("Dispatch must fail while the source is failing.");

	assert!(matches!(err, Error::RefreshFailed(_)));
	// No partial overwrite: the expired credential is still installed as-is.
	assert!(matches!(client.held_token(), HeldToken::Genuine(held) if held == stale));
}

#[tokio::test]
async fn forced_refresh_always_reinstalls_a_valid_token() {
	let source = Arc::new(CountingSource::succeeding(std::time::Duration::ZERO));
	let transport = RecordingTransport::default();
	let client = build_client(transport, source.clone());
	let first = client.refresh_token_now().await.expect("First forced refresh should succeed.");
	let second = client.refresh_token_now().await.expect("Second forced refresh should succeed.");

	// Always a valid credential, but the remote work is repeated on every call.
	assert_ne!(first.access_token().expose(), second.access_token().expose());
	assert!(!second.is_expired());
	assert!(!client.held_token().needs_refresh());
	assert_eq!(source.calls(), 2);
}
