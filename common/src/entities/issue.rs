use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{default_timestamp, repository::Entity};

#[derive(
    Debug, Display, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema,
)]
pub enum Category {
    Garbage,
    Pothole,
    Lighting,
    Safety,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Garbage,
        Category::Pothole,
        Category::Lighting,
        Category::Safety,
        Category::Other,
    ];

    /// Lenient reading of a stored value: anything unknown lands in `Other`.
    pub fn from_stored(value: &str) -> Category {
        value.parse().unwrap_or(Category::Other)
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.to_string() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", s))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Category::from_stored(&value))
    }
}

impl From<Category> for Bson {
    fn from(category: Category) -> Self {
        Bson::String(category.to_string())
    }
}

#[derive(
    Debug, Display, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema,
)]
pub enum Status {
    Open,
    Resolved,
}

impl Status {
    /// Status reached by asking for `target`, if the move is allowed.
    /// Resolution is one-way; repeating the current status is a no-op.
    pub fn apply(&self, target: Status) -> Option<Status> {
        match (self, target) {
            (Status::Open, Status::Open) => Some(Status::Open),
            (Status::Open, Status::Resolved) => Some(Status::Resolved),
            (Status::Resolved, Status::Resolved) => Some(Status::Resolved),
            (Status::Resolved, Status::Open) => None,
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Status::Open),
            "Resolved" => Ok(Status::Resolved),
            _ => anyhow::bail!("Unknown status: {}", s),
        }
    }
}

impl From<Status> for Bson {
    fn from(status: Status) -> Self {
        Bson::String(status.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Issue {
    #[serde(with = "crate::uuid_string")]
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub status: Status,
    #[serde(with = "crate::rfc3339_micros")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// A fresh, open issue with a new id and creation time.
    pub fn new(title: String, description: String, category: Category, location: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            location,
            status: Status::Open,
            created_at: default_timestamp(),
        }
    }
}

impl Entity for Issue {
    const ID_FIELD: &'static str = "id";
    const TIMESTAMP_FIELD: &'static str = "created_at";

    fn id(&self) -> Bson {
        Bson::String(self.id.to_string())
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolution_is_one_way() {
        assert_eq!(Status::Open.apply(Status::Resolved), Some(Status::Resolved));
        assert_eq!(Status::Resolved.apply(Status::Resolved), Some(Status::Resolved));
        assert_eq!(Status::Open.apply(Status::Open), Some(Status::Open));
        assert_eq!(Status::Resolved.apply(Status::Open), None);
    }

    #[test]
    fn test_category_parsing_is_strict() {
        assert_eq!("Pothole".parse::<Category>().unwrap(), Category::Pothole);
        assert!("pothole".parse::<Category>().is_err());
        assert!("Flood".parse::<Category>().is_err());
    }

    #[test]
    fn test_stored_unknown_category_reads_as_other() {
        let issue: Issue = serde_json::from_value(json!({
            "id": "0b6f4a40-5f2e-4f4c-9b1a-3f4a1c2d9e10",
            "title": "Flooded underpass",
            "description": "Water has been pooling under the bridge since Monday.",
            "category": "Flood",
            "location": "Main St underpass",
            "status": "Open",
            "created_at": "2024-03-01T10:00:00+00:00",
        }))
        .unwrap();

        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.status, Status::Open);
    }

    #[test]
    fn test_created_at_has_fixed_precision() {
        let mut issue = Issue::new(
            "Overflowing bin".to_string(),
            "The bin at the park entrance overflows every weekend.".to_string(),
            Category::Garbage,
            "Park entrance".to_string(),
        );
        issue.created_at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["created_at"], "2024-03-01T10:00:00.000000Z");
        assert_eq!(value["status"], "Open");
        assert_eq!(value["category"], "Garbage");
    }
}
