pub mod keywords;
pub mod paging;
pub mod preferences;
pub mod translate;
