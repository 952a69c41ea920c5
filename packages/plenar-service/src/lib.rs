pub mod graph;
pub mod list;
pub mod profile;
pub mod protocol;
pub mod search;
pub mod store;
pub mod telemetry;
pub mod verify;

mod error;

pub use error::{Error, Result};
pub use graph::GraphQueryRequest;
pub use list::{ListRequest, ListResponse, ListView, ProtocolCard};
pub use profile::{InterestProfile, PreferenceRequest};
pub use protocol::{AgendaItemView, ProtocolDetail, ProtocolView, SpeechView};
pub use search::{SearchRequest, SearchResponse};
pub use store::PgRecordStore;
pub use verify::{DataCounts, ProtocolSample, SampleData, SpeakerView};

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

use plenar_config::Config;
use plenar_domain::translate::Dictionary;
use plenar_graph::ResilientGraphQuery;
use plenar_storage::{
	db::Db,
	models::{
		AgendaItem, PreferenceAppend, Protocol, SearchPage, Speaker, Speech, TableCounts,
	},
	queries::ProtocolFilter,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type StoreResult<T> = plenar_storage::Result<T>;

/// Read and write access to the relational store.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Protocols matching `filter`, newest first.
	fn list_protocols<'a>(
		&'a self,
		filter: &'a ProtocolFilter,
	) -> BoxFuture<'a, StoreResult<Vec<Protocol>>>;

	fn get_protocol<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<Protocol>>>;

	fn first_agenda_item<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<AgendaItem>>>;

	fn get_agenda_item<'a>(
		&'a self,
		agenda_item_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<AgendaItem>>>;

	fn list_agenda_items<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Vec<AgendaItem>>>;

	fn first_speech<'a>(&'a self, match_key: &'a str) -> BoxFuture<'a, StoreResult<Option<Speech>>>;

	fn list_speeches<'a>(&'a self, match_key: &'a str) -> BoxFuture<'a, StoreResult<Vec<Speech>>>;

	fn speakers_by_ids<'a>(
		&'a self,
		speaker_ids: &'a [String],
	) -> BoxFuture<'a, StoreResult<Vec<Speaker>>>;

	/// Server-side full-text search over speeches, grouped by protocol.
	fn search<'a>(
		&'a self,
		query: &'a str,
		page: u32,
		page_size: u32,
	) -> BoxFuture<'a, StoreResult<SearchPage>>;

	fn insert_search_history<'a>(
		&'a self,
		user_id: Uuid,
		query: &'a str,
		created_at: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<()>>;

	fn list_search_history<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, StoreResult<Vec<String>>>;

	fn load_preferences<'a>(
		&'a self,
		user_id: Uuid,
	) -> BoxFuture<'a, StoreResult<Option<Vec<String>>>>;

	/// Appends `preference` if the list holds fewer than `max` entries and not the same value.
	///
	/// The check and the write must be one atomic step.
	fn append_preference<'a>(
		&'a self,
		user_id: Uuid,
		preference: &'a str,
		max: usize,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<PreferenceAppend>>;

	/// `None` when the profile does not exist.
	fn remove_preference<'a>(
		&'a self,
		user_id: Uuid,
		preference: &'a str,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<Option<Vec<String>>>>;

	/// Clears preferences and search history together, or neither.
	fn reset_privacy<'a>(
		&'a self,
		user_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<u64>>;

	fn recent_protocols<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Protocol>>>;

	fn agenda_items_for_protocols<'a>(
		&'a self,
		protocol_ids: &'a [String],
	) -> BoxFuture<'a, StoreResult<Vec<AgendaItem>>>;

	fn recent_speeches<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Speech>>>;

	fn list_speakers<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Speaker>>>;

	fn table_counts<'a>(&'a self) -> BoxFuture<'a, StoreResult<TableCounts>>;
}

/// Rewrites a user query into the store's indexing language.
pub trait Translator
where
	Self: Send + Sync,
{
	fn translate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub struct DictionaryTranslator {
	dictionary: Dictionary,
}
impl DictionaryTranslator {
	pub fn new(dictionary: Dictionary) -> Self {
		Self { dictionary }
	}
}
impl Translator for DictionaryTranslator {
	fn translate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Ok(self.dictionary.translate(text)) })
	}
}

/// Who issued a request. Guests never have history recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUser {
	Guest,
	User(Uuid),
}
impl SessionUser {
	pub fn user_id(&self) -> Option<Uuid> {
		match self {
			Self::Guest => None,
			Self::User(user_id) => Some(*user_id),
		}
	}
}

pub struct PlenarService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
	pub translator: Arc<dyn Translator>,
	pub graph: Arc<ResilientGraphQuery>,
}
impl PlenarService {
	pub fn new(
		cfg: Config,
		store: Arc<dyn RecordStore>,
		translator: Arc<dyn Translator>,
		graph: Arc<ResilientGraphQuery>,
	) -> Self {
		Self { cfg, store, translator, graph }
	}

	/// Connects to Postgres, bootstraps the schema, and wires the default collaborators.
	///
	/// The graph store is not contacted until the first graph query.
	pub async fn connect(cfg: Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		let translator = DictionaryTranslator::new(Dictionary::from_config(&cfg.translation));
		let graph = ResilientGraphQuery::from_config(&cfg.graph);

		tracing::info!(
			dictionary_entries = cfg.translation.dictionary.len(),
			"Plenar service connected."
		);

		Ok(Self::new(
			cfg,
			Arc::new(PgRecordStore::new(db)),
			Arc::new(translator),
			Arc::new(graph),
		))
	}
}
