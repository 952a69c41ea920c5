use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use plenar_storage::models::Speaker;

use crate::{AgendaItemView, PlenarService, ProtocolView, Result, SpeechView};

/// Rows per table in [`SampleData`].
pub const SAMPLE_SIZE: i64 = 5;

/// Row counts of the record tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCounts {
	pub protocols: i64,
	pub agenda_items: i64,
	pub speeches: i64,
	pub speakers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSample {
	pub protocol: ProtocolView,
	/// Ordered by match key.
	pub agenda_items: Vec<AgendaItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerView {
	pub speaker_id: String,
	pub full_name: String,
}
impl From<Speaker> for SpeakerView {
	fn from(speaker: Speaker) -> Self {
		Self { speaker_id: speaker.speaker_id, full_name: speaker.full_name }
	}
}

/// A few rows of each table for eyeballing an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
	/// Newest first.
	pub recent_protocols: Vec<ProtocolSample>,
	/// Highest speech id first.
	pub recent_speeches: Vec<SpeechView>,
	/// Ordered by speaker id.
	pub speakers: Vec<SpeakerView>,
}

impl PlenarService {
	pub async fn data_counts(&self) -> Result<DataCounts> {
		let counts = self.store.table_counts().await?;

		if counts.protocols == 0 {
			tracing::warn!("Protocol table is empty.");
		}

		Ok(DataCounts {
			protocols: counts.protocols,
			agenda_items: counts.agenda_items,
			speeches: counts.speeches,
			speakers: counts.speakers,
		})
	}

	/// Reads the three samples concurrently, then resolves agenda items and speaker names in
	/// one batch each.
	pub async fn sample_data(&self) -> Result<SampleData> {
		let (protocols, speeches, speakers) = tokio::join!(
			self.store.recent_protocols(SAMPLE_SIZE),
			self.store.recent_speeches(SAMPLE_SIZE),
			self.store.list_speakers(SAMPLE_SIZE),
		);
		let protocols = protocols?;
		let protocol_ids: Vec<String> =
			protocols.iter().map(|protocol| protocol.id.clone()).collect();
		let mut items_by_protocol: HashMap<String, Vec<AgendaItemView>> = HashMap::new();

		for item in self.store.agenda_items_for_protocols(&protocol_ids).await? {
			items_by_protocol.entry(item.protocol_id.clone()).or_default().push(item.into());
		}

		let recent_protocols = protocols
			.into_iter()
			.map(|protocol| ProtocolSample {
				agenda_items: items_by_protocol.remove(&protocol.id).unwrap_or_default(),
				protocol: protocol.into(),
			})
			.collect();
		let recent_speeches = self.speech_views(speeches?).await?;
		let speakers = speakers?.into_iter().map(SpeakerView::from).collect();

		Ok(SampleData { recent_protocols, recent_speeches, speakers })
	}
}
