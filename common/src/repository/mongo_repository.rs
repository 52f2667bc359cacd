use async_trait::async_trait;
use futures::StreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use serde::{de::DeserializeOwned, Serialize};

use super::{skip_unreadable, Entity, Filter, Query, Repository};

pub struct MongoRepository<T> {
    pub collection: mongodb::Collection<T>,
}

impl<T> MongoRepository<T> {
    pub async fn new(mongo_uri: &str, database: &str, collection: &str) -> anyhow::Result<Self> {
        let collection = mongodb::Client::with_uri_str(mongo_uri)
            .await?
            .database(database)
            .collection(collection);
        Ok(Self { collection })
    }
}

pub(crate) fn filter_document(query: &Query) -> Document {
    let conditions: Vec<Document> = query
        .filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq { field, value } => {
                let mut condition = Document::new();
                condition.insert(field.as_str(), value.clone());
                condition
            }
            Filter::Contains { fields, pattern } => {
                let pattern = regex::escape(pattern);
                let alternatives: Vec<Document> = fields
                    .iter()
                    .map(|field| {
                        let mut condition = Document::new();
                        condition.insert(
                            field.as_str(),
                            doc! { "$regex": pattern.as_str(), "$options": "i" },
                        );
                        condition
                    })
                    .collect();
                doc! { "$or": alternatives }
            }
        })
        .collect();

    match conditions.len() {
        0 => Document::new(),
        1 => conditions.into_iter().next().unwrap_or_default(),
        _ => doc! { "$and": conditions },
    }
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Entity + Serialize + DeserializeOwned + Unpin + Clone + Send + Sync,
{
    async fn insert(&self, item: &T) -> anyhow::Result<T> {
        let id_field = T::ID_FIELD;
        let exists = self
            .collection
            .find_one(doc! {id_field: item.id()}, None)
            .await?
            .is_some();

        if exists {
            anyhow::bail!("Item with id {} already exists", item.id());
        }

        self.collection.insert_one(item, None).await?;
        Ok(item.clone())
    }

    async fn find(&self, field: &str, value: &Bson) -> anyhow::Result<Option<T>> {
        let result = self.collection.find_one(doc! {field: value}, None).await?;
        Ok(result)
    }

    async fn find_many(&self, query: &Query) -> anyhow::Result<Vec<T>> {
        let timestamp_field = T::TIMESTAMP_FIELD;
        let find_options = if query.newest_first {
            FindOptions::builder()
                .sort(doc! {timestamp_field: -1})
                .build()
        } else {
            FindOptions::default()
        };

        let documents: Vec<mongodb::error::Result<Document>> = self
            .collection
            .clone_with_type::<Document>()
            .find(filter_document(query), find_options)
            .await?
            .collect()
            .await;
        let documents = documents
            .into_iter()
            .collect::<mongodb::error::Result<Vec<Document>>>()?;

        Ok(skip_unreadable(
            documents.into_iter().map(bson::from_document::<T>),
        ))
    }

    async fn update(
        &self,
        field: &str,
        value: &Bson,
        change: Document,
    ) -> anyhow::Result<Option<T>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(doc! {field: value}, doc! {"$set": change}, options)
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(filter_document(&Query::new()), Document::new());
    }

    #[test]
    fn test_single_equality() {
        let query = Query::new().eq("status", "Open");
        assert_eq!(filter_document(&query), doc! {"status": "Open"});
    }

    #[test]
    fn test_filters_are_conjunctive_and_patterns_literal() {
        let query = Query::new()
            .eq("category", "Lighting")
            .contains(&["title", "description"], "a.b");

        assert_eq!(
            filter_document(&query),
            doc! {
                "$and": [
                    {"category": "Lighting"},
                    {"$or": [
                        {"title": {"$regex": "a\\.b", "$options": "i"}},
                        {"description": {"$regex": "a\\.b", "$options": "i"}},
                    ]},
                ]
            }
        );
    }
}
