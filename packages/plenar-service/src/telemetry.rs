use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber at the configured level.
///
/// An unparsable level falls back to `info`. Fails if a global subscriber is already set.
pub fn init_tracing(cfg: &plenar_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&cfg.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.try_init()
		.map_err(|err| eyre::eyre!("Failed to install tracing subscriber: {err}."))
}
