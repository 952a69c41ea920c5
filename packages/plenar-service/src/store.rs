use time::OffsetDateTime;
use uuid::Uuid;

use plenar_storage::{
	db::Db,
	models::{
		AgendaItem, PreferenceAppend, Protocol, SearchPage, Speaker, Speech, TableCounts,
	},
	queries::{self, ProtocolFilter},
};

use crate::{BoxFuture, RecordStore, StoreResult};

/// [`RecordStore`] over the Postgres pool.
pub struct PgRecordStore {
	db: Db,
}
impl PgRecordStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}
impl RecordStore for PgRecordStore {
	fn list_protocols<'a>(
		&'a self,
		filter: &'a ProtocolFilter,
	) -> BoxFuture<'a, StoreResult<Vec<Protocol>>> {
		Box::pin(queries::list_protocols(&self.db.pool, filter))
	}

	fn get_protocol<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<Protocol>>> {
		Box::pin(queries::get_protocol(&self.db.pool, protocol_id))
	}

	fn first_agenda_item<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<AgendaItem>>> {
		Box::pin(queries::first_agenda_item(&self.db.pool, protocol_id))
	}

	fn get_agenda_item<'a>(
		&'a self,
		agenda_item_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<AgendaItem>>> {
		Box::pin(queries::get_agenda_item(&self.db.pool, agenda_item_id))
	}

	fn list_agenda_items<'a>(
		&'a self,
		protocol_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Vec<AgendaItem>>> {
		Box::pin(queries::list_agenda_items(&self.db.pool, protocol_id))
	}

	fn first_speech<'a>(&'a self, match_key: &'a str) -> BoxFuture<'a, StoreResult<Option<Speech>>> {
		Box::pin(queries::first_speech(&self.db.pool, match_key))
	}

	fn list_speeches<'a>(&'a self, match_key: &'a str) -> BoxFuture<'a, StoreResult<Vec<Speech>>> {
		Box::pin(queries::list_speeches(&self.db.pool, match_key))
	}

	fn speakers_by_ids<'a>(
		&'a self,
		speaker_ids: &'a [String],
	) -> BoxFuture<'a, StoreResult<Vec<Speaker>>> {
		Box::pin(queries::speakers_by_ids(&self.db.pool, speaker_ids))
	}

	fn search<'a>(
		&'a self,
		query: &'a str,
		page: u32,
		page_size: u32,
	) -> BoxFuture<'a, StoreResult<SearchPage>> {
		Box::pin(queries::search_speeches(&self.db.pool, query, page, page_size))
	}

	fn insert_search_history<'a>(
		&'a self,
		user_id: Uuid,
		query: &'a str,
		created_at: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(queries::insert_search_history(&self.db.pool, user_id, query, created_at))
	}

	fn list_search_history<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, StoreResult<Vec<String>>> {
		Box::pin(queries::list_search_history(&self.db.pool, user_id))
	}

	fn load_preferences<'a>(
		&'a self,
		user_id: Uuid,
	) -> BoxFuture<'a, StoreResult<Option<Vec<String>>>> {
		Box::pin(queries::load_preferences(&self.db.pool, user_id))
	}

	fn append_preference<'a>(
		&'a self,
		user_id: Uuid,
		preference: &'a str,
		max: usize,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<PreferenceAppend>> {
		Box::pin(queries::append_preference(&self.db.pool, user_id, preference, max, now))
	}

	fn remove_preference<'a>(
		&'a self,
		user_id: Uuid,
		preference: &'a str,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<Option<Vec<String>>>> {
		Box::pin(queries::remove_preference(&self.db.pool, user_id, preference, now))
	}

	fn reset_privacy<'a>(
		&'a self,
		user_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'a, StoreResult<u64>> {
		Box::pin(queries::reset_privacy(&self.db.pool, user_id, now))
	}

	fn recent_protocols<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Protocol>>> {
		Box::pin(queries::recent_protocols(&self.db.pool, limit))
	}

	fn agenda_items_for_protocols<'a>(
		&'a self,
		protocol_ids: &'a [String],
	) -> BoxFuture<'a, StoreResult<Vec<AgendaItem>>> {
		Box::pin(queries::agenda_items_for_protocols(&self.db.pool, protocol_ids))
	}

	fn recent_speeches<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Speech>>> {
		Box::pin(queries::recent_speeches(&self.db.pool, limit))
	}

	fn list_speakers<'a>(&'a self, limit: i64) -> BoxFuture<'a, StoreResult<Vec<Speaker>>> {
		Box::pin(queries::list_speakers(&self.db.pool, limit))
	}

	fn table_counts<'a>(&'a self) -> BoxFuture<'a, StoreResult<TableCounts>> {
		Box::pin(queries::table_counts(&self.db.pool))
	}
}
