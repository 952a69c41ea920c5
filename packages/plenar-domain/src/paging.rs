use serde::{Deserialize, Serialize};

/// Zero-based page window over an in-memory result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
	pub page: u32,
	pub page_size: u32,
}
impl PageWindow {
	pub fn new(page: u32, page_size: u32) -> Option<Self> {
		(page_size > 0).then_some(Self { page, page_size })
	}

	pub fn offset(&self) -> usize {
		self.page as usize * self.page_size as usize
	}

	/// Index range of this page within `total` items. Empty when the page lies past the end.
	pub fn range(&self, total: usize) -> std::ops::Range<usize> {
		let start = self.offset().min(total);
		let end = start.saturating_add(self.page_size as usize).min(total);

		start..end
	}

	pub fn has_more(&self, total: usize) -> bool {
		(self.page as usize + 1) * (self.page_size as usize) < total
	}

	pub fn page_count(&self, total: usize) -> u32 {
		total.div_ceil(self.page_size as usize) as u32
	}
}
