/// Why a preference could not be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceReject {
	Empty,
	Duplicate,
	LimitReached { max: usize },
}

/// The stored form of a preference: trimmed and non-empty.
pub fn normalize_preference(candidate: &str) -> Result<&str, PreferenceReject> {
	let candidate = candidate.trim();

	if candidate.is_empty() {
		return Err(PreferenceReject::Empty);
	}

	Ok(candidate)
}

/// Returns the updated preference list with `candidate` appended.
///
/// Duplicates are detected by exact match after trimming, mirroring how preferences are stored.
pub fn add_preference(
	current: &[String],
	candidate: &str,
	max: usize,
) -> Result<Vec<String>, PreferenceReject> {
	let candidate = normalize_preference(candidate)?;

	if current.len() >= max {
		return Err(PreferenceReject::LimitReached { max });
	}
	if current.iter().any(|existing| existing == candidate) {
		return Err(PreferenceReject::Duplicate);
	}

	let mut next = current.to_vec();

	next.push(candidate.to_string());

	Ok(next)
}

/// Removing an absent preference leaves the list unchanged.
pub fn remove_preference(current: &[String], preference: &str) -> Vec<String> {
	let preference = preference.trim();

	current.iter().filter(|existing| existing.as_str() != preference).cloned().collect()
}
