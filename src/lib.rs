//! Bearer-token HTTP client that gates API requests on cached-credential freshness and
//! funnels refreshes through a single-flight guard before attaching `Authorization` headers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod error;
pub mod obs;
pub mod source;
pub mod token;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{client::BearerClient, source::HttpTokenSource, transport::ReqwestTransport};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = BearerClient<ReqwestTransport, HttpTokenSource>;

	/// Builds a reqwest client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Constructs a [`BearerClient`] wired to the test transport and an [`HttpTokenSource`]
	/// pointed at the provided token endpoint.
	pub fn build_reqwest_test_client(base_url: Url, token_endpoint: Url) -> ReqwestTestClient {
		let transport = ReqwestTransport::with_client(test_reqwest_client());
		let source = HttpTokenSource::new(token_endpoint).with_client(test_reqwest_client());

		BearerClient::with_transport(base_url, transport, source)
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {bearer_client as _, httpmock as _, tokio as _};
