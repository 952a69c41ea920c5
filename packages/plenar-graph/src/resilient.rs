use std::{
	sync::{
		Arc,
		atomic::{AtomicU8, Ordering},
	},
	time::Duration,
};

use tokio::{sync::Mutex, time};

use crate::{
	Error, GraphConnector, GraphDriver, GraphSession, Params, Record, Result, http::HttpConnector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	Uninitialized,
	Connecting,
	Ready,
}
impl ConnectionState {
	fn from_u8(raw: u8) -> Self {
		match raw {
			1 => Self::Connecting,
			2 => Self::Ready,
			_ => Self::Uninitialized,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_delay: Duration,
}
impl RetryPolicy {
	pub fn from_config(cfg: &plenar_config::Graph) -> Self {
		Self {
			max_attempts: cfg.max_attempts,
			initial_delay: Duration::from_millis(cfg.initial_delay_ms),
		}
	}

	/// Delay after the failed 0-indexed `attempt`; `None` once no attempt follows.
	pub fn backoff(&self, attempt: u32) -> Option<Duration> {
		if attempt.saturating_add(1) >= self.max_attempts {
			return None;
		}

		Some(self.initial_delay.saturating_mul(2_u32.saturating_pow(attempt)))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: 3, initial_delay: Duration::from_millis(1_000) }
	}
}

/// Lazily connected, retrying entry point to the graph store.
///
/// One driver is shared by all callers. Callers arriving while it is being created wait for that
/// initialization instead of starting their own.
pub struct ResilientGraphQuery {
	connector: Arc<dyn GraphConnector>,
	policy: RetryPolicy,
	constraints: Vec<String>,
	driver: Mutex<Option<Arc<dyn GraphDriver>>>,
	state: AtomicU8,
}
impl ResilientGraphQuery {
	pub fn new(
		connector: Arc<dyn GraphConnector>,
		policy: RetryPolicy,
		constraints: Vec<String>,
	) -> Self {
		Self {
			connector,
			policy,
			constraints,
			driver: Mutex::new(None),
			state: AtomicU8::new(ConnectionState::Uninitialized as u8),
		}
	}

	pub fn from_config(cfg: &plenar_config::Graph) -> Self {
		Self::new(
			Arc::new(HttpConnector::new(cfg.clone())),
			RetryPolicy::from_config(cfg),
			cfg.constraints.clone(),
		)
	}

	pub fn state(&self) -> ConnectionState {
		ConnectionState::from_u8(self.state.load(Ordering::Acquire))
	}

	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	/// Runs `query`, retrying with exponential backoff. Returns the last failure once every
	/// attempt is spent.
	pub async fn run(&self, query: &str, params: &Params) -> Result<Vec<Record>> {
		let mut last = None;

		for attempt in 0..self.policy.max_attempts {
			match self.attempt(query, params).await {
				Ok(records) => return Ok(records),
				Err(err) => {
					tracing::warn!(
						error = %err,
						attempt = attempt + 1,
						max_attempts = self.policy.max_attempts,
						"Graph query attempt failed."
					);

					last = Some(err);
				},
			}

			if let Some(delay) = self.policy.backoff(attempt) {
				time::sleep(delay).await;
			}
		}

		let last = last.unwrap_or_else(|| Error::Unavailable {
			message: "No graph query attempt was made.".to_string(),
		});

		Err(Error::Exhausted { attempts: self.policy.max_attempts, last: Box::new(last) })
	}

	/// Drops the shared driver. The next `run` connects again.
	pub async fn close(&self) {
		let mut slot = self.driver.lock().await;

		if let Some(driver) = slot.take() {
			driver.close().await;
		}

		self.set_state(ConnectionState::Uninitialized);
	}

	async fn attempt(&self, query: &str, params: &Params) -> Result<Vec<Record>> {
		let driver = self.driver().await?;
		let mut session = driver.open_session().await?;
		let result = session.run(query, params).await;

		close_session(&mut session).await;

		result
	}

	async fn driver(&self) -> Result<Arc<dyn GraphDriver>> {
		let mut slot = self.driver.lock().await;

		if let Some(driver) = slot.as_ref() {
			return Ok(Arc::clone(driver));
		}

		self.set_state(ConnectionState::Connecting);

		match self.initialize().await {
			Ok(driver) => {
				*slot = Some(Arc::clone(&driver));

				self.set_state(ConnectionState::Ready);

				Ok(driver)
			},
			Err(err) => {
				self.set_state(ConnectionState::Uninitialized);

				Err(err)
			},
		}
	}

	async fn initialize(&self) -> Result<Arc<dyn GraphDriver>> {
		let driver = self.connector.connect().await?;

		if let Err(err) = self.prepare(driver.as_ref()).await {
			tracing::warn!(error = %err, "Graph initialization failed. Discarding driver.");

			driver.close().await;

			return Err(err);
		}

		tracing::info!(constraints = self.constraints.len(), "Graph connection ready.");

		Ok(driver)
	}

	async fn prepare(&self, driver: &dyn GraphDriver) -> Result<()> {
		driver.verify_connectivity().await?;

		let params = Params::new();

		for statement in &self.constraints {
			let mut session = driver.open_session().await?;
			let result = session.run(statement, &params).await;

			close_session(&mut session).await;

			result?;
		}

		Ok(())
	}

	fn set_state(&self, state: ConnectionState) {
		self.state.store(state as u8, Ordering::Release);
	}
}

async fn close_session(session: &mut Box<dyn GraphSession>) {
	if let Err(err) = session.close().await {
		tracing::warn!(error = %err, "Failed to close graph session.");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backoff_doubles_and_stops_before_last_attempt() {
		let policy = RetryPolicy::default();

		assert_eq!(policy.backoff(0), Some(Duration::from_millis(1_000)));
		assert_eq!(policy.backoff(1), Some(Duration::from_millis(2_000)));
		assert_eq!(policy.backoff(2), None);
	}

	#[test]
	fn single_attempt_never_waits() {
		let policy = RetryPolicy { max_attempts: 1, initial_delay: Duration::from_millis(500) };

		assert_eq!(policy.backoff(0), None);
	}

	#[test]
	fn state_round_trips_through_atomic_encoding() {
		for state in
			[ConnectionState::Uninitialized, ConnectionState::Connecting, ConnectionState::Ready]
		{
			assert_eq!(ConnectionState::from_u8(state as u8), state);
		}
	}
}
