pub mod mongo_repository;
pub mod postgrest_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};

pub trait Entity {
    const ID_FIELD: &'static str;
    const TIMESTAMP_FIELD: &'static str;

    fn id(&self) -> Bson;
    fn timestamp(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Exact match on a single field.
    Eq { field: String, value: Bson },
    /// Case-insensitive substring match on any of the fields.
    Contains { fields: Vec<String>, pattern: String },
}

/// Conjunction of filters, optionally ordered by the entity timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub newest_first: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn contains(mut self, fields: &[&str], pattern: &str) -> Self {
        self.filters.push(Filter::Contains {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            pattern: pattern.to_string(),
        });
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }
}

#[async_trait]
pub trait Repository<T> {
    /// Stores a new item and returns the record as persisted.
    async fn insert(&self, item: &T) -> anyhow::Result<T>;
    async fn find(&self, field: &str, value: &Bson) -> anyhow::Result<Option<T>>;
    async fn find_many(&self, query: &Query) -> anyhow::Result<Vec<T>>;
    /// Sets the fields of `change` on the item matching `field == value`
    /// and returns it, or `None` when nothing matched.
    async fn update(&self, field: &str, value: &Bson, change: Document)
        -> anyhow::Result<Option<T>>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T> + Send + Sync>;

/// Keeps the rows that read back as `T`. Rows that don't are logged and
/// left out of scans, so one malformed record cannot fail a whole listing.
pub(crate) fn skip_unreadable<T, E: std::fmt::Display>(
    rows: impl IntoIterator<Item = Result<T, E>>,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(item) => Some(item),
            Err(err) => {
                log::warn!(
                    "Skipping unreadable {} record: {}",
                    std::any::type_name::<T>(),
                    err
                );
                None
            }
        })
        .collect()
}
