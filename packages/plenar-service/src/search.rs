use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use plenar_domain::paging::PageWindow;

use crate::{Error, PlenarService, ProtocolCard, Result, SessionUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	/// The trimmed query as typed.
	pub query: String,
	/// The query actually sent to the store.
	pub search_query: String,
	pub items: Vec<ProtocolCard>,
	pub page: u32,
	pub page_size: u32,
	pub total_count: u64,
	pub page_count: u32,
	pub has_more: bool,
}

impl PlenarService {
	/// Full-text search over speeches, one page of protocols at a time.
	///
	/// The query is translated into the indexing language before it reaches the store, and
	/// recorded in the caller's history. Neither step can fail the search.
	pub async fn search(&self, user: SessionUser, req: SearchRequest) -> Result<SearchResponse> {
		let page_size = self.cfg.search.page_size;
		let window = PageWindow::new(req.page, page_size).ok_or_else(|| Error::InvalidRequest {
			message: "search.page_size must be greater than zero.".to_string(),
		})?;
		let query = req.query.trim();

		if query.is_empty() {
			return Ok(SearchResponse {
				query: String::new(),
				search_query: String::new(),
				items: Vec::new(),
				page: window.page,
				page_size,
				total_count: 0,
				page_count: 0,
				has_more: false,
			});
		}

		let (_, (search_query, page)) = tokio::join!(self.record_history(user, query), async {
			let search_query = self.translate(query).await;
			let page = self.store.search(&search_query, window.page, page_size).await;

			(search_query, page)
		});
		let page = page?;
		let total = usize::try_from(page.total_count).unwrap_or(0);

		Ok(SearchResponse {
			query: query.to_string(),
			search_query,
			items: page.protocols.into_iter().map(ProtocolCard::from).collect(),
			page: window.page,
			page_size,
			total_count: total as u64,
			page_count: window.page_count(total),
			has_more: window.has_more(total),
		})
	}

	async fn translate(&self, query: &str) -> String {
		match self.translator.translate(query).await {
			Ok(translated) if !translated.trim().is_empty() => translated,
			Ok(_) => query.to_string(),
			Err(err) => {
				tracing::warn!(error = %err, "Query translation failed. Searching untranslated.");

				query.to_string()
			},
		}
	}

	async fn record_history(&self, user: SessionUser, query: &str) {
		let Some(user_id) = user.user_id() else {
			return;
		};

		if let Err(err) =
			self.store.insert_search_history(user_id, query, OffsetDateTime::now_utc()).await
		{
			tracing::warn!(error = %err, user_id = %user_id, "Failed to record search history.");
		}
	}
}
