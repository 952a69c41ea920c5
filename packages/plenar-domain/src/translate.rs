use std::collections::BTreeMap;

/// Word-level dictionary translation into the store's indexing language.
///
/// The query is case-folded before lookup. Words without an entry pass through in their
/// case-folded form, so word order and count are always preserved.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
	entries: BTreeMap<String, String>,
}
impl Dictionary {
	pub fn new(entries: BTreeMap<String, String>) -> Self {
		let entries = entries.into_iter().map(|(word, value)| (word.to_lowercase(), value)).collect();

		Self { entries }
	}

	pub fn from_config(cfg: &plenar_config::Translation) -> Self {
		Self::new(cfg.dictionary.clone())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn translate(&self, text: &str) -> String {
		text.to_lowercase()
			.split_whitespace()
			.map(|word| self.entries.get(word).map(String::as_str).unwrap_or(word))
			.collect::<Vec<_>>()
			.join(" ")
	}
}
