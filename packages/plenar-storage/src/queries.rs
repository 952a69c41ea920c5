use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{AgendaItem, PreferenceAppend, Protocol, SearchPage, Speaker, Speech, TableCounts},
};

const PROTOCOL_COLUMNS: &str = "\
SELECT
	id,
	title,
	legislatureperiod AS legislature_period,
	number,
	date
FROM protocol";

const AGENDA_ITEM_COLUMNS: &str = "\
SELECT
	id,
	protocolid AS protocol_id,
	title,
	description,
	itemorder AS item_order,
	matchag AS match_key
FROM agendaitem";

const SPEECH_COLUMNS: &str = "\
SELECT
	nlpspeechid AS speech_id,
	speakerid AS speaker_id,
	matchag AS match_key,
	getabstractsummarypegasus AS summary
FROM speech";

/// Equality and range predicates over `protocol`, combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolFilter {
	pub legislature_period: Option<i32>,
	pub number: Option<i32>,
	pub year: Option<i32>,
}

/// Half-open `[start, end)` range covering one calendar year in UTC.
pub fn year_bounds(year: i32) -> Result<(OffsetDateTime, OffsetDateTime)> {
	let invalid = |_| Error::InvalidArgument(format!("Year {year} is out of range."));
	let start = Date::from_calendar_date(year, Month::January, 1).map_err(invalid)?;
	let end = Date::from_calendar_date(year.saturating_add(1), Month::January, 1).map_err(invalid)?;

	Ok((start.midnight().assume_utc(), end.midnight().assume_utc()))
}

/// All protocols matching `filter`, newest first. Ties on date are broken by id descending.
pub async fn list_protocols<'e, E>(executor: E, filter: &ProtocolFilter) -> Result<Vec<Protocol>>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new(PROTOCOL_COLUMNS);

	builder.push(" WHERE TRUE");

	if let Some(period) = filter.legislature_period {
		builder.push(" AND legislatureperiod = ");
		builder.push_bind(period);
	}
	if let Some(number) = filter.number {
		builder.push(" AND number = ");
		builder.push_bind(number);
	}
	if let Some(year) = filter.year {
		let (start, end) = year_bounds(year)?;

		builder.push(" AND date >= ");
		builder.push_bind(start);
		builder.push(" AND date < ");
		builder.push_bind(end);
	}

	builder.push(" ORDER BY date DESC, id DESC");

	let rows = builder.build_query_as::<Protocol>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn get_protocol<'e, E>(executor: E, protocol_id: &str) -> Result<Option<Protocol>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{PROTOCOL_COLUMNS} WHERE id = $1");
	let row = sqlx::query_as::<_, Protocol>(&sql).bind(protocol_id).fetch_optional(executor).await?;

	Ok(row)
}

/// The agenda item that opens a protocol: lowest `itemorder`, then lowest id.
pub async fn first_agenda_item<'e, E>(executor: E, protocol_id: &str) -> Result<Option<AgendaItem>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"{AGENDA_ITEM_COLUMNS} WHERE protocolid = $1 ORDER BY itemorder ASC, id ASC LIMIT 1"
	);
	let row =
		sqlx::query_as::<_, AgendaItem>(&sql).bind(protocol_id).fetch_optional(executor).await?;

	Ok(row)
}

pub async fn get_agenda_item<'e, E>(executor: E, agenda_item_id: &str) -> Result<Option<AgendaItem>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{AGENDA_ITEM_COLUMNS} WHERE id = $1");
	let row =
		sqlx::query_as::<_, AgendaItem>(&sql).bind(agenda_item_id).fetch_optional(executor).await?;

	Ok(row)
}

/// All agenda items of a protocol ordered by match key, as shown in the detail view.
pub async fn list_agenda_items<'e, E>(executor: E, protocol_id: &str) -> Result<Vec<AgendaItem>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{AGENDA_ITEM_COLUMNS} WHERE protocolid = $1 ORDER BY matchag ASC, id ASC");
	let rows = sqlx::query_as::<_, AgendaItem>(&sql).bind(protocol_id).fetch_all(executor).await?;

	Ok(rows)
}

/// The speech with the lowest id for a match key.
pub async fn first_speech<'e, E>(executor: E, match_key: &str) -> Result<Option<Speech>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{SPEECH_COLUMNS} WHERE matchag = $1 ORDER BY nlpspeechid ASC LIMIT 1");
	let row = sqlx::query_as::<_, Speech>(&sql).bind(match_key).fetch_optional(executor).await?;

	Ok(row)
}

pub async fn list_speeches<'e, E>(executor: E, match_key: &str) -> Result<Vec<Speech>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{SPEECH_COLUMNS} WHERE matchag = $1 ORDER BY nlpspeechid ASC");
	let rows = sqlx::query_as::<_, Speech>(&sql).bind(match_key).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn speakers_by_ids<'e, E>(executor: E, speaker_ids: &[String]) -> Result<Vec<Speaker>>
where
	E: PgExecutor<'e>,
{
	if speaker_ids.is_empty() {
		return Ok(vec![]);
	}

	let rows = sqlx::query_as::<_, Speaker>(
		"\
SELECT
	speakerid AS speaker_id,
	fullname AS full_name
FROM speaker
WHERE speakerid = ANY($1::text[])",
	)
	.bind(speaker_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Calls the server-side full-text search function.
pub async fn search_speeches<'e, E>(
	executor: E,
	query: &str,
	page: u32,
	page_size: u32,
) -> Result<SearchPage>
where
	E: PgExecutor<'e>,
{
	let page = i32::try_from(page)
		.map_err(|_| Error::InvalidArgument("Page number is out of range.".to_string()))?;
	let page_size = i32::try_from(page_size)
		.map_err(|_| Error::InvalidArgument("Page size is out of range.".to_string()))?;
	let payload: Option<serde_json::Value> =
		sqlx::query_scalar("SELECT search_speeches_fast($1, $2, $3)")
			.bind(query)
			.bind(page)
			.bind(page_size)
			.fetch_one(executor)
			.await?;
	let Some(payload) = payload else {
		return Ok(SearchPage { protocols: vec![], total_count: 0 });
	};

	Ok(serde_json::from_value(payload)?)
}

pub async fn insert_search_history<'e, E>(
	executor: E,
	user_id: Uuid,
	query: &str,
	created_at: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO search_history (id, user_id, query, created_at)
VALUES ($1, $2, $3, $4)",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(query)
	.bind(created_at)
	.execute(executor)
	.await?;

	Ok(())
}

/// Raw queries of a user, newest first.
pub async fn list_search_history<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<String> = sqlx::query_scalar(
		"\
SELECT query
FROM search_history
WHERE user_id = $1
ORDER BY created_at DESC, id DESC",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// `None` when the user has no profile row.
pub async fn load_preferences<'e, E>(executor: E, user_id: Uuid) -> Result<Option<Vec<String>>>
where
	E: PgExecutor<'e>,
{
	let row: Option<Vec<String>> =
		sqlx::query_scalar("SELECT preferences FROM profiles WHERE id = $1")
			.bind(user_id)
			.fetch_optional(executor)
			.await?;

	Ok(row)
}

/// Appends `preference` unless the list is full or already holds it.
///
/// The profile row stays locked from the check to the write, so concurrent appends for one user
/// run one after another and each sees the list left by the previous.
pub async fn append_preference(
	pool: &PgPool,
	user_id: Uuid,
	preference: &str,
	max: usize,
	now: OffsetDateTime,
) -> Result<PreferenceAppend> {
	let mut tx = pool.begin().await?;
	let current: Option<Vec<String>> =
		sqlx::query_scalar("SELECT preferences FROM profiles WHERE id = $1 FOR UPDATE")
			.bind(user_id)
			.fetch_optional(&mut *tx)
			.await?;
	let Some(current) = current else {
		return Ok(PreferenceAppend::MissingProfile);
	};

	if let Some(rejected) = append_rejection(&current, preference, max) {
		return Ok(rejected);
	}

	let stored: Vec<String> = sqlx::query_scalar(
		"\
UPDATE profiles
SET preferences = array_append(preferences, $1), updated_at = $3
WHERE id = $2
RETURNING preferences",
	)
	.bind(preference)
	.bind(user_id)
	.bind(now)
	.fetch_one(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(PreferenceAppend::Appended(stored))
}

/// A full list wins over a duplicate.
fn append_rejection(current: &[String], preference: &str, max: usize) -> Option<PreferenceAppend> {
	if current.len() >= max {
		return Some(PreferenceAppend::LimitReached);
	}
	if current.iter().any(|existing| existing == preference) {
		return Some(PreferenceAppend::Duplicate);
	}

	None
}

/// Removes every occurrence of `preference`. `None` when the user has no profile row.
pub async fn remove_preference<'e, E>(
	executor: E,
	user_id: Uuid,
	preference: &str,
	now: OffsetDateTime,
) -> Result<Option<Vec<String>>>
where
	E: PgExecutor<'e>,
{
	let row: Option<Vec<String>> = sqlx::query_scalar(
		"\
UPDATE profiles
SET preferences = array_remove(preferences, $1), updated_at = $3
WHERE id = $2
RETURNING preferences",
	)
	.bind(preference)
	.bind(user_id)
	.bind(now)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Clears preferences and deletes the search history of a user in one transaction.
///
/// Returns the number of deleted history rows. Nothing changes when the profile does not exist.
pub async fn reset_privacy(pool: &PgPool, user_id: Uuid, now: OffsetDateTime) -> Result<u64> {
	let mut tx = pool.begin().await?;
	let deleted = sqlx::query("DELETE FROM search_history WHERE user_id = $1")
		.bind(user_id)
		.execute(&mut *tx)
		.await?
		.rows_affected();
	let cleared = sqlx::query(
		"\
UPDATE profiles
SET preferences = '{}'::text[], updated_at = $2
WHERE id = $1",
	)
	.bind(user_id)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	if cleared.rows_affected() == 0 {
		// Dropping the transaction rolls the history delete back.
		return Err(Error::NotFound(format!("Profile {user_id} does not exist.")));
	}

	tx.commit().await?;

	Ok(deleted)
}

/// The most recent protocols, newest first.
pub async fn recent_protocols<'e, E>(executor: E, limit: i64) -> Result<Vec<Protocol>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{PROTOCOL_COLUMNS} ORDER BY date DESC, id DESC LIMIT $1");
	let rows = sqlx::query_as::<_, Protocol>(&sql).bind(limit).fetch_all(executor).await?;

	Ok(rows)
}

/// Agenda items of several protocols, grouped by protocol and ordered by match key within each.
pub async fn agenda_items_for_protocols<'e, E>(
	executor: E,
	protocol_ids: &[String],
) -> Result<Vec<AgendaItem>>
where
	E: PgExecutor<'e>,
{
	if protocol_ids.is_empty() {
		return Ok(vec![]);
	}

	let sql = format!(
		"{AGENDA_ITEM_COLUMNS} WHERE protocolid = ANY($1::text[]) \
		 ORDER BY protocolid ASC, matchag ASC, id ASC"
	);
	let rows = sqlx::query_as::<_, AgendaItem>(&sql).bind(protocol_ids).fetch_all(executor).await?;

	Ok(rows)
}

/// Speeches with the highest ids first.
pub async fn recent_speeches<'e, E>(executor: E, limit: i64) -> Result<Vec<Speech>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{SPEECH_COLUMNS} ORDER BY nlpspeechid DESC LIMIT $1");
	let rows = sqlx::query_as::<_, Speech>(&sql).bind(limit).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn list_speakers<'e, E>(executor: E, limit: i64) -> Result<Vec<Speaker>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, Speaker>(
		"\
SELECT
	speakerid AS speaker_id,
	fullname AS full_name
FROM speaker
ORDER BY speakerid ASC
LIMIT $1",
	)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn table_counts<'e, E>(executor: E) -> Result<TableCounts>
where
	E: PgExecutor<'e>,
{
	let counts = sqlx::query_as::<_, TableCounts>(
		"\
SELECT
	(SELECT count(*) FROM protocol) AS protocols,
	(SELECT count(*) FROM agendaitem) AS agenda_items,
	(SELECT count(*) FROM speech) AS speeches,
	(SELECT count(*) FROM speaker) AS speakers",
	)
	.fetch_one(executor)
	.await?;

	Ok(counts)
}
