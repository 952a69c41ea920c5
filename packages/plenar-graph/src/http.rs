//! Neo4j HTTP transactional API.

use std::{sync::Arc, time::Duration};

use reqwest::{
	Client, StatusCode,
	header::{ACCEPT, HeaderMap, HeaderName, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{BoxFuture, Error, GraphConnector, GraphDriver, GraphSession, Params, Record, Result};

pub struct HttpConnector {
	cfg: plenar_config::Graph,
}
impl HttpConnector {
	pub fn new(cfg: plenar_config::Graph) -> Self {
		Self { cfg }
	}
}
impl GraphConnector for HttpConnector {
	fn connect<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn GraphDriver>>> {
		Box::pin(async move {
			let driver = HttpGraphDriver::new(&self.cfg)?;

			Ok(Arc::new(driver) as Arc<dyn GraphDriver>)
		})
	}
}

#[derive(Debug)]
struct Endpoint {
	/// `{url}/db/{database}`
	database_url: String,
	username: String,
	password: String,
}

pub struct HttpGraphDriver {
	client: Client,
	endpoint: Arc<Endpoint>,
}
impl HttpGraphDriver {
	pub fn new(cfg: &plenar_config::Graph) -> Result<Self> {
		if cfg.url.trim().is_empty() {
			return Err(Error::InvalidConfig { message: "Graph URL must be non-empty.".to_string() });
		}

		let mut headers = HeaderMap::new();

		headers.insert(ACCEPT, HeaderValue::from_static("application/json;charset=UTF-8"));
		headers.insert(HeaderName::from_static("x-stream"), HeaderValue::from_static("true"));

		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(headers)
			.build()?;
		let endpoint = Endpoint {
			database_url: format!("{}/db/{}", cfg.url.trim_end_matches('/'), cfg.database),
			username: cfg.username.clone(),
			password: cfg.password.clone(),
		};

		Ok(Self { client, endpoint: Arc::new(endpoint) })
	}

	fn session(&self, tx_url: String, commit_url: String) -> HttpSession {
		HttpSession {
			client: self.client.clone(),
			endpoint: Arc::clone(&self.endpoint),
			tx_url,
			commit_url,
			open: true,
		}
	}
}
impl GraphDriver for HttpGraphDriver {
	fn verify_connectivity<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let url = format!("{}/tx/commit", self.endpoint.database_url);
			let response =
				post(&self.client, &self.endpoint, &url, &serde_json::json!({ "statements": [] }))
					.await?;

			check_errors(&response)
		})
	}

	fn open_session<'a>(&'a self) -> BoxFuture<'a, Result<Box<dyn GraphSession>>> {
		Box::pin(async move {
			let url = format!("{}/tx", self.endpoint.database_url);
			let response =
				post(&self.client, &self.endpoint, &url, &serde_json::json!({ "statements": [] }))
					.await?;

			let commit_url = match (check_errors(&response), response.commit) {
				(Ok(()), Some(commit_url)) => commit_url,
				(Ok(()), None) => {
					return Err(Error::InvalidResponse {
						message: "Transaction response is missing the commit URL.".to_string(),
					});
				},
				(Err(err), None) => return Err(err),
				(Err(err), Some(commit_url)) => {
					// The server opened a transaction despite the errors; roll it back.
					if let Ok(tx_url) = transaction_url(&commit_url) {
						let mut session = self.session(tx_url, commit_url);

						if let Err(close_err) = session.close().await {
							tracing::warn!(
								error = %close_err,
								"Failed to roll back graph transaction opened with errors."
							);
						}
					}

					return Err(err);
				},
			};
			let tx_url = transaction_url(&commit_url)?;

			Ok(Box::new(self.session(tx_url, commit_url)) as Box<dyn GraphSession>)
		})
	}

	fn close<'a>(&'a self) -> BoxFuture<'a, ()> {
		// Connections are pooled by the client and released with it.
		Box::pin(async {})
	}
}

/// One open transaction. `run` commits it; `close` rolls back whatever is still open.
struct HttpSession {
	client: Client,
	endpoint: Arc<Endpoint>,
	tx_url: String,
	commit_url: String,
	open: bool,
}
impl GraphSession for HttpSession {
	fn run<'a>(
		&'a mut self,
		query: &'a str,
		params: &'a Params,
	) -> BoxFuture<'a, Result<Vec<Record>>> {
		Box::pin(async move {
			if !self.open {
				return Err(Error::InvalidResponse {
					message: "Graph session is already committed.".to_string(),
				});
			}

			let body = serde_json::json!({
				"statements": [{ "statement": query, "parameters": params }],
			});
			let response = post(&self.client, &self.endpoint, &self.commit_url, &body).await?;

			// The server ends the transaction once it answers a commit, even with errors.
			self.open = false;

			into_records(response)
		})
	}

	fn close<'a>(&'a mut self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if !self.open {
				return Ok(());
			}

			let res = self
				.client
				.delete(&self.tx_url)
				.basic_auth(&self.endpoint.username, Some(&self.endpoint.password))
				.send()
				.await?;

			self.open = false;

			// An expired transaction is already gone.
			if res.status() == StatusCode::NOT_FOUND {
				return Ok(());
			}

			res.error_for_status()?;

			Ok(())
		})
	}
}

#[derive(Debug, Deserialize)]
struct TxResponse {
	#[serde(default)]
	commit: Option<String>,
	#[serde(default)]
	results: Vec<StatementResult>,
	#[serde(default)]
	errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
	columns: Vec<String>,
	#[serde(default)]
	data: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
	row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
	#[serde(default)]
	code: String,
	#[serde(default)]
	message: String,
}

async fn post(
	client: &Client,
	endpoint: &Endpoint,
	url: &str,
	body: &Value,
) -> Result<TxResponse> {
	let res = client
		.post(url)
		.basic_auth(&endpoint.username, Some(&endpoint.password))
		.json(body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(serde_json::from_value(json)?)
}

fn check_errors(response: &TxResponse) -> Result<()> {
	match response.errors.first() {
		Some(err) => Err(Error::Statement { code: err.code.clone(), message: err.message.clone() }),
		None => Ok(()),
	}
}

fn into_records(response: TxResponse) -> Result<Vec<Record>> {
	check_errors(&response)?;

	let Some(result) = response.results.into_iter().next() else {
		return Err(Error::InvalidResponse {
			message: "Graph response is missing the statement result.".to_string(),
		});
	};
	let mut records = Vec::with_capacity(result.data.len());

	for row in result.data {
		let mut record = Record::new();

		for (column, value) in result.columns.iter().zip(row.row) {
			record.insert(column.clone(), value);
		}

		records.push(record);
	}

	Ok(records)
}

fn transaction_url(commit_url: &str) -> Result<String> {
	commit_url.strip_suffix("/commit").map(ToString::to_string).ok_or_else(|| {
		Error::InvalidResponse { message: format!("Unexpected commit URL {commit_url:?}.") }
	})
}
