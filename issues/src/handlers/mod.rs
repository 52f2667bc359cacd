pub mod indexer;
pub mod issues;
pub mod stats;
pub mod suggest;
