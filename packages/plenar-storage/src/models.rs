use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Protocol {
	pub id: String,
	pub title: Option<String>,
	pub legislature_period: i32,
	pub number: i32,
	pub date: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AgendaItem {
	pub id: String,
	pub protocol_id: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub item_order: i32,
	/// Shared join attribute with `speech.matchag`.
	pub match_key: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Speech {
	pub speech_id: Uuid,
	pub speaker_id: String,
	pub match_key: String,
	pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Speaker {
	pub speaker_id: String,
	pub full_name: String,
}

/// One protocol row as returned by `search_speeches_fast`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
	pub id: String,
	pub title: Option<String>,
	#[serde(rename = "legislatureperiod")]
	pub legislature_period: i32,
	pub number: i32,
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	pub first_speech_id: Option<Uuid>,
	pub first_speech_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchPage {
	#[serde(default)]
	pub protocols: Vec<SearchHit>,
	#[serde(default)]
	pub total_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct TableCounts {
	pub protocols: i64,
	pub agenda_items: i64,
	pub speeches: i64,
	pub speakers: i64,
}

/// Outcome of a conditional preference append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceAppend {
	/// The stored list after the append.
	Appended(Vec<String>),
	Duplicate,
	LimitReached,
	MissingProfile,
}
