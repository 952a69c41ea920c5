use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use plenar_storage::models::{AgendaItem, Protocol, Speech};

use crate::{Error, PlenarService, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolView {
	pub id: String,
	pub title: Option<String>,
	pub legislature_period: i32,
	pub number: i32,
	#[serde(with = "plenar_storage::time_serde")]
	pub date: OffsetDateTime,
}
impl From<Protocol> for ProtocolView {
	fn from(protocol: Protocol) -> Self {
		Self {
			id: protocol.id,
			title: protocol.title,
			legislature_period: protocol.legislature_period,
			number: protocol.number,
			date: protocol.date,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItemView {
	pub id: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub item_order: i32,
	pub match_key: String,
}
impl From<AgendaItem> for AgendaItemView {
	fn from(item: AgendaItem) -> Self {
		Self {
			id: item.id,
			title: item.title,
			description: item.description,
			item_order: item.item_order,
			match_key: item.match_key,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolDetail {
	pub protocol: ProtocolView,
	/// Ordered by match key.
	pub agenda_items: Vec<AgendaItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechView {
	pub speech_id: Uuid,
	pub speaker_id: String,
	pub speaker_name: String,
	pub summary: Option<String>,
}

impl PlenarService {
	pub async fn protocol_detail(&self, protocol_id: &str) -> Result<ProtocolDetail> {
		let protocol_id = protocol_id.trim();

		if protocol_id.is_empty() {
			return Err(Error::InvalidRequest { message: "protocol_id is required.".to_string() });
		}

		let Some(protocol) = self.store.get_protocol(protocol_id).await? else {
			return Err(Error::NotFound { message: format!("Protocol {protocol_id} not found.") });
		};
		let agenda_items = self.store.list_agenda_items(protocol_id).await?;

		Ok(ProtocolDetail {
			protocol: protocol.into(),
			agenda_items: agenda_items.into_iter().map(AgendaItemView::from).collect(),
		})
	}

	/// Speeches of one agenda item in speech id order, with speaker names resolved.
	pub async fn agenda_speeches(&self, agenda_item_id: &str) -> Result<Vec<SpeechView>> {
		let agenda_item_id = agenda_item_id.trim();

		if agenda_item_id.is_empty() {
			return Err(Error::InvalidRequest {
				message: "agenda_item_id is required.".to_string(),
			});
		}

		let Some(item) = self.store.get_agenda_item(agenda_item_id).await? else {
			return Err(Error::NotFound {
				message: format!("Agenda item {agenda_item_id} not found."),
			});
		};
		let speeches = self.store.list_speeches(&item.match_key).await?;

		self.speech_views(speeches).await
	}

	/// Resolves speaker names with one batched lookup. Unknown speakers get a placeholder name.
	pub(crate) async fn speech_views(&self, speeches: Vec<Speech>) -> Result<Vec<SpeechView>> {
		if speeches.is_empty() {
			return Ok(Vec::new());
		}

		let mut speaker_ids: Vec<String> =
			speeches.iter().map(|speech| speech.speaker_id.clone()).collect();

		speaker_ids.sort();
		speaker_ids.dedup();

		let names: HashMap<String, String> = self
			.store
			.speakers_by_ids(&speaker_ids)
			.await?
			.into_iter()
			.map(|speaker| (speaker.speaker_id, speaker.full_name))
			.collect();

		Ok(speeches
			.into_iter()
			.map(|speech| {
				let speaker_name = names
					.get(&speech.speaker_id)
					.cloned()
					.unwrap_or_else(|| format!("Speaker {}", speech.speaker_id));

				SpeechView {
					speech_id: speech.speech_id,
					speaker_id: speech.speaker_id,
					speaker_name,
					summary: speech.summary,
				}
			})
			.collect())
	}
}
