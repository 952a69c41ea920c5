use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use plenar_domain::{keywords, preferences};
use plenar_storage::models::PreferenceAppend;

use crate::{Error, PlenarService, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRequest {
	pub user_id: Uuid,
	pub preference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestProfile {
	pub user_id: Uuid,
	pub preferences: Vec<String>,
	/// Raw queries, newest first.
	pub history: Vec<String>,
	/// Distinct words of preferences and history, sorted.
	pub keywords: Vec<String>,
}

impl PlenarService {
	/// Appends a preference and returns the stored list.
	///
	/// Concurrent appends for one user are serialized by the store, so none of them is lost.
	pub async fn add_preference(&self, req: PreferenceRequest) -> Result<Vec<String>> {
		let preference = preferences::normalize_preference(&req.preference).map_err(|_| {
			Error::InvalidRequest { message: "Preference must be non-empty.".to_string() }
		})?;
		let max = self.cfg.profile.max_preferences as usize;
		let outcome = self
			.store
			.append_preference(req.user_id, preference, max, OffsetDateTime::now_utc())
			.await?;

		match outcome {
			PreferenceAppend::Appended(preferences) => Ok(preferences),
			PreferenceAppend::LimitReached => Err(Error::InvalidRequest {
				message: format!("At most {max} preferences are allowed."),
			}),
			PreferenceAppend::Duplicate => Err(Error::Conflict {
				message: format!("Preference {preference:?} already exists."),
			}),
			PreferenceAppend::MissingProfile => Err(profile_not_found(req.user_id)),
		}
	}

	/// Removes a preference if present and returns the stored list.
	pub async fn remove_preference(&self, req: PreferenceRequest) -> Result<Vec<String>> {
		self.store
			.remove_preference(req.user_id, req.preference.trim(), OffsetDateTime::now_utc())
			.await?
			.ok_or_else(|| profile_not_found(req.user_id))
	}

	pub async fn interest_profile(&self, user_id: Uuid) -> Result<InterestProfile> {
		let (preferences, history) =
			tokio::join!(self.preferences_of(user_id), self.store.list_search_history(user_id));
		let preferences = preferences?;
		let history = history?;
		let keywords = keywords::distinct_keywords(&preferences, &history);

		Ok(InterestProfile { user_id, preferences, history, keywords })
	}

	/// Forgets everything derived from the user's behavior: preferences and search history.
	///
	/// Both are cleared in one transaction. A missing profile leaves the history untouched.
	pub async fn reset_privacy(&self, user_id: Uuid) -> Result<u64> {
		let removed = self.store.reset_privacy(user_id, OffsetDateTime::now_utc()).await?;

		tracing::info!(user_id = %user_id, removed_queries = removed, "Privacy reset completed.");

		Ok(removed)
	}

	async fn preferences_of(&self, user_id: Uuid) -> Result<Vec<String>> {
		self.store.load_preferences(user_id).await?.ok_or_else(|| profile_not_found(user_id))
	}
}

fn profile_not_found(user_id: Uuid) -> Error {
	Error::NotFound { message: format!("Profile {user_id} not found.") }
}
