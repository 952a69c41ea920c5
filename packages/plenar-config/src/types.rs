use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub graph: Graph,
	pub search: Search,
	#[serde(default)]
	pub profile: Profile,
	#[serde(default)]
	pub translation: Translation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Graph {
	/// Base URL of the HTTP transactional endpoint, e.g. "https://graph.example.org".
	pub url: String,
	#[serde(default = "default_graph_database")]
	pub database: String,
	pub username: String,
	pub password: String,
	#[serde(default = "default_graph_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_graph_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_graph_initial_delay_ms")]
	pub initial_delay_ms: u64,
	/// Statements run once per connection. Each must be idempotent ("IF NOT EXISTS").
	#[serde(default)]
	pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Page size of the search-result view.
	#[serde(default = "default_search_page_size")]
	pub page_size: u32,
	/// Page size of the home view.
	#[serde(default = "default_home_page_size")]
	pub home_page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
	#[serde(default = "default_max_preferences")]
	pub max_preferences: u32,
}
impl Default for Profile {
	fn default() -> Self {
		Self { max_preferences: default_max_preferences() }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Translation {
	/// Lowercase source word to indexing-language word.
	#[serde(default)]
	pub dictionary: BTreeMap<String, String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_graph_database() -> String {
	"neo4j".to_string()
}

fn default_graph_timeout_ms() -> u64 {
	10_000
}

fn default_graph_max_attempts() -> u32 {
	3
}

fn default_graph_initial_delay_ms() -> u64 {
	1_000
}

fn default_search_page_size() -> u32 {
	9
}

fn default_home_page_size() -> u32 {
	3
}

fn default_max_preferences() -> u32 {
	5
}
