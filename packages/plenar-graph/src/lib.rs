//! Client for the secondary graph store.
//!
//! [`ResilientGraphQuery`] owns one lazily created [`GraphDriver`] and retries failed queries with
//! exponential backoff. [`http::HttpConnector`] speaks the HTTP transactional API.

pub mod http;
pub mod resilient;

mod error;

pub use error::{Error, Result};
pub use resilient::{ConnectionState, ResilientGraphQuery, RetryPolicy};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One result row keyed by column name.
pub type Record = Map<String, Value>;

pub type Params = Map<String, Value>;

/// Creates drivers. Called again after a failed initialization.
pub trait GraphConnector
where
	Self: Send + Sync,
{
	fn connect<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn GraphDriver>>>;
}

pub trait GraphDriver
where
	Self: Send + Sync,
{
	fn verify_connectivity<'a>(&'a self) -> BoxFuture<'a, Result<()>>;

	fn open_session<'a>(&'a self) -> BoxFuture<'a, Result<Box<dyn GraphSession>>>;

	fn close<'a>(&'a self) -> BoxFuture<'a, ()>;
}

pub trait GraphSession
where
	Self: Send,
{
	fn run<'a>(
		&'a mut self,
		query: &'a str,
		params: &'a Params,
	) -> BoxFuture<'a, Result<Vec<Record>>>;

	/// Releases the session. Must be safe to call after a failed `run`.
	fn close<'a>(&'a mut self) -> BoxFuture<'a, Result<()>>;
}
