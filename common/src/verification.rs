use futures_util::StreamExt;
use mongodb::bson::{self, Document};
use serde::de::DeserializeOwned;

/// Outcome of reading a whole collection back as `T`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verification {
    pub readable: usize,
    pub unreadable: usize,
}

impl Verification {
    pub fn tally<T, E: std::fmt::Display>(rows: impl IntoIterator<Item = Result<T, E>>) -> Self {
        rows.into_iter()
            .fold(Self::default(), |mut verification, row| {
                match row {
                    Ok(_) => verification.readable += 1,
                    Err(err) => {
                        log::warn!("Unreadable {} record: {}", std::any::type_name::<T>(), err);
                        verification.unreadable += 1;
                    }
                }
                verification
            })
    }
}

/// Checks that every stored document still deserializes into `T`. Unreadable
/// documents are reported, not fatal: scans skip them.
pub async fn verify<T: DeserializeOwned>(
    mongo_uri: &str,
    database: &str,
    collection: &str,
) -> anyhow::Result<Verification> {
    let client = mongodb::Client::with_uri_str(mongo_uri).await?;
    let collection = client.database(database).collection::<Document>(collection);

    let documents = collection
        .find(None, None)
        .await?
        .collect::<Vec<Result<Document, mongodb::error::Error>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<Document>, mongodb::error::Error>>()?;

    Ok(Verification::tally(
        documents.into_iter().map(bson::from_document::<T>),
    ))
}
