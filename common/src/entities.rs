pub mod issue;
pub mod stats;
