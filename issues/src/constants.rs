pub const TITLE_MIN_LENGTH: usize = 5;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MIN_LENGTH: usize = 20;
pub const LOCATION_MIN_LENGTH: usize = 5;

pub const ISSUES_TABLE: &str = "issues";

pub const SEARCH_FIELDS: [&str; 2] = ["title", "description"];
