use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::task::JoinSet;
use uuid::Uuid;

use plenar_domain::paging::PageWindow;
use plenar_storage::{
	models::{Protocol, SearchHit, Speech},
	queries::ProtocolFilter,
};

use crate::{Error, PlenarService, RecordStore, Result, StoreResult};

/// Which screen a listing feeds. Each has its own default page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListView {
	#[default]
	Home,
	Results,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
	pub legislature_period: Option<i32>,
	pub number: Option<i32>,
	pub year: Option<i32>,
	#[serde(default)]
	pub page: u32,
	/// Overrides the view's configured page size.
	pub page_size: Option<u32>,
	#[serde(default)]
	pub view: ListView,
}

/// A protocol together with the summary of its first speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolCard {
	pub id: String,
	pub title: Option<String>,
	pub legislature_period: i32,
	pub number: i32,
	#[serde(with = "plenar_storage::time_serde")]
	pub date: OffsetDateTime,
	pub first_speech_id: Option<Uuid>,
	/// Empty when the protocol has no agenda item or speech to summarize.
	pub first_speech_summary: String,
}
impl ProtocolCard {
	pub fn new(protocol: Protocol, first_speech: Option<Speech>) -> Self {
		let (first_speech_id, first_speech_summary) = match first_speech {
			Some(speech) => (Some(speech.speech_id), speech.summary.unwrap_or_default()),
			None => (None, String::new()),
		};

		Self {
			id: protocol.id,
			title: protocol.title,
			legislature_period: protocol.legislature_period,
			number: protocol.number,
			date: protocol.date,
			first_speech_id,
			first_speech_summary,
		}
	}
}
impl From<SearchHit> for ProtocolCard {
	fn from(hit: SearchHit) -> Self {
		Self {
			id: hit.id,
			title: hit.title,
			legislature_period: hit.legislature_period,
			number: hit.number,
			date: hit.date,
			first_speech_id: hit.first_speech_id,
			first_speech_summary: hit.first_speech_summary.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
	pub items: Vec<ProtocolCard>,
	pub page: u32,
	pub page_size: u32,
	pub total: u64,
	pub page_count: u32,
	pub has_more: bool,
}

impl PlenarService {
	/// Lists protocols matching the filters, newest first, one page at a time.
	///
	/// Every protocol on the page is enriched with its first speech. A failed enrichment only
	/// leaves that card without a summary.
	pub async fn list(&self, req: ListRequest) -> Result<ListResponse> {
		let page_size = req.page_size.unwrap_or(match req.view {
			ListView::Home => self.cfg.search.home_page_size,
			ListView::Results => self.cfg.search.page_size,
		});
		let window = PageWindow::new(req.page, page_size).ok_or_else(|| Error::InvalidRequest {
			message: "page_size must be greater than zero.".to_string(),
		})?;
		let filter = ProtocolFilter {
			legislature_period: req.legislature_period,
			number: req.number,
			year: req.year,
		};
		let protocols = self.store.list_protocols(&filter).await?;
		let total = protocols.len();
		let range = window.range(total);
		let page: Vec<Protocol> =
			protocols.into_iter().skip(range.start).take(range.len()).collect();
		let items = enrich(&self.store, page).await;

		Ok(ListResponse {
			items,
			page: window.page,
			page_size: window.page_size,
			total: total as u64,
			page_count: window.page_count(total),
			has_more: window.has_more(total),
		})
	}
}

async fn enrich(store: &Arc<dyn RecordStore>, protocols: Vec<Protocol>) -> Vec<ProtocolCard> {
	let mut tasks = JoinSet::new();

	for (index, protocol) in protocols.iter().enumerate() {
		let store = Arc::clone(store);
		let protocol_id = protocol.id.clone();

		tasks.spawn(async move { (index, first_speech(store.as_ref(), &protocol_id).await) });
	}

	let mut firsts: Vec<Option<Speech>> = protocols.iter().map(|_| None).collect();

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((index, Ok(speech))) => firsts[index] = speech,
			Ok((index, Err(err))) => {
				tracing::warn!(
					error = %err,
					protocol_id = %protocols[index].id,
					"Failed to load first speech. Listing protocol without a summary."
				);
			},
			Err(err) => {
				tracing::warn!(error = %err, "Enrichment task did not complete.");
			},
		}
	}

	protocols
		.into_iter()
		.zip(firsts)
		.map(|(protocol, speech)| ProtocolCard::new(protocol, speech))
		.collect()
}

/// First speech of the protocol's first agenda item.
async fn first_speech(store: &dyn RecordStore, protocol_id: &str) -> StoreResult<Option<Speech>> {
	let Some(item) = store.first_agenda_item(protocol_id).await? else {
		return Ok(None);
	};

	store.first_speech(&item.match_key).await
}
