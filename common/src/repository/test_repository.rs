use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use super::{skip_unreadable, Entity, Filter, Query, Repository};

/// In-memory store keeping items as BSON documents in insertion order.
pub struct TestRepository<T> {
    _t: std::marker::PhantomData<fn() -> T>,
    pub db: Mutex<Vec<Document>>,
}

impl<T> Default for TestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(Vec::new()),
        }
    }

    fn db(&self) -> anyhow::Result<MutexGuard<'_, Vec<Document>>> {
        self.db.lock().map_err(|_| anyhow!("Test repository lock poisoned"))
    }
}

impl<T: Serialize> TestRepository<T> {
    pub fn with_items(items: &[T]) -> anyhow::Result<Self> {
        let documents = items
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(documents),
        })
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => document.get(field) == Some(value),
        Filter::Contains { fields, pattern } => {
            let pattern = pattern.to_lowercase();
            fields.iter().any(|field| {
                document
                    .get_str(field)
                    .map(|text| text.to_lowercase().contains(&pattern))
                    .unwrap_or(false)
            })
        }
    }
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Entity + Clone + Send + Sync + Serialize + DeserializeOwned,
{
    async fn insert(&self, item: &T) -> anyhow::Result<T> {
        let mut db = self.db()?;

        let id = item.id();
        if db.iter().any(|x| x.get(T::ID_FIELD) == Some(&id)) {
            anyhow::bail!("Item with id {} already exists", id);
        }

        let document = bson::to_document(item)?;
        let stored = bson::from_document(document.clone())?;
        db.push(document);
        Ok(stored)
    }

    async fn find(&self, field: &str, value: &Bson) -> anyhow::Result<Option<T>> {
        let db = self.db()?;
        db.iter()
            .find(|x| x.get(field) == Some(value))
            .cloned()
            .map(bson::from_document)
            .transpose()
            .map_err(Into::into)
    }

    async fn find_many(&self, query: &Query) -> anyhow::Result<Vec<T>> {
        let db = self.db()?;
        let mut items: Vec<T> = skip_unreadable(
            db.iter()
                .filter(|x| query.filters.iter().all(|filter| matches(x, filter)))
                .cloned()
                .map(bson::from_document),
        );

        if query.newest_first {
            items.sort_by_key(|item| std::cmp::Reverse(item.timestamp()));
        }
        Ok(items)
    }

    async fn update(
        &self,
        field: &str,
        value: &Bson,
        change: Document,
    ) -> anyhow::Result<Option<T>> {
        let mut db = self.db()?;
        let Some(document) = db.iter_mut().find(|x| x.get(field) == Some(value)) else {
            return Ok(None);
        };

        document.extend(change);
        Ok(Some(bson::from_document(document.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use mongodb::bson::doc;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
        kind: String,
        #[serde(with = "crate::rfc3339_micros")]
        created_at: DateTime<Utc>,
    }

    impl Entity for Note {
        const ID_FIELD: &'static str = "id";
        const TIMESTAMP_FIELD: &'static str = "created_at";

        fn id(&self) -> Bson {
            Bson::String(self.id.clone())
        }

        fn timestamp(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn note(id: &str, text: &str, kind: &str, minutes: i64) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            kind: kind.to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc)
                + Duration::minutes(minutes),
        }
    }

    fn repo() -> TestRepository<Note> {
        TestRepository::with_items(&[
            note("a", "Streetlight out", "Lighting", 1),
            note("b", "Bins overflowing", "Garbage", 3),
            note("c", "Dark alley light", "Lighting", 2),
        ])
        .unwrap()
    }

    #[actix_web::test]
    async fn test_newest_first() {
        let ids: Vec<String> = repo()
            .find_many(&Query::new().newest_first())
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[actix_web::test]
    async fn test_conjunctive_filters() {
        let found = repo()
            .find_many(&Query::new().eq("kind", "Lighting").contains(&["text"], "LIGHT"))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let found = repo()
            .find_many(&Query::new().eq("kind", "Garbage").contains(&["text"], "light"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[actix_web::test]
    async fn test_update_and_duplicate_insert() {
        let repo = repo();
        let id = Bson::String("a".to_string());

        let updated = repo
            .update("id", &id, doc! {"kind": "Safety"})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.kind, "Safety");

        let missing = repo
            .update("id", &Bson::String("zzz".to_string()), doc! {"kind": "Safety"})
            .await
            .unwrap();
        assert!(missing.is_none());

        assert!(repo.insert(&note("a", "again", "Other", 9)).await.is_err());
        assert_eq!(repo.db.lock().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_scan_skips_unreadable_rows() {
        let repo = repo();
        repo.db
            .lock()
            .unwrap()
            .push(doc! {"id": "d", "text": "No timestamp", "kind": "Lighting"});

        let found = repo
            .find_many(&Query::new().eq("kind", "Lighting").newest_first())
            .await
            .unwrap();
        let ids: Vec<String> = found.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}
