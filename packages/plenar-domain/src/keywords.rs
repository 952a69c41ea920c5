//! Interest-profile keyword extraction.
//!
//! Preferences and raw search queries are merged into one sorted set of distinct words. Words are
//! compared case-insensitively; a word spelled as a proper noun anywhere in the input keeps its
//! capitalized form, every other word is lowercased.

use std::{
	collections::{BTreeSet, HashMap},
	sync::LazyLock,
};

use regex::Regex;

static PROPER_NOUN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Z][a-z]+$").expect("Proper noun pattern must compile.")
});

/// ASCII-only: one uppercase letter followed by lowercase letters. "Berlin" qualifies, "NASA",
/// "Baden-Baden" and "Zürich" do not.
pub fn is_proper_noun(word: &str) -> bool {
	PROPER_NOUN.is_match(word)
}

/// Builds the distinct keyword set for a profile.
///
/// The result is sorted by byte order, so capitalized words come before lowercase ones.
pub fn distinct_keywords<P, H>(preferences: P, history: H) -> Vec<String>
where
	P: IntoIterator,
	P::Item: AsRef<str>,
	H: IntoIterator,
	H::Item: AsRef<str>,
{
	let mut proper_by_key: HashMap<String, bool> = HashMap::new();
	let entries = preferences
		.into_iter()
		.map(|entry| entry.as_ref().trim().to_string())
		.chain(history.into_iter().map(|entry| entry.as_ref().trim().to_string()))
		.filter(|entry| !entry.is_empty());

	for entry in entries {
		for word in entry.split_whitespace() {
			let proper = is_proper_noun(word);
			let seen = proper_by_key.entry(word.to_lowercase()).or_insert(proper);

			*seen |= proper;
		}
	}

	let keywords: BTreeSet<String> = proper_by_key
		.into_iter()
		.map(|(key, proper)| if proper { capitalize(&key) } else { key })
		.collect();

	keywords.into_iter().collect()
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
