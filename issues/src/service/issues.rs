use anyhow::{anyhow, Context as _};
use mongodb::bson::{doc, Bson};
use uuid::Uuid;

use common::{
    api::issues::{CreateIssue, IssueQuery, StatusChange},
    context::Context,
    entities::{
        issue::{Category, Issue, Status},
        stats::IssueStats,
    },
    error::{self, AddCode},
    repository::{Entity, Query},
};

use crate::constants::{
    DESCRIPTION_MIN_LENGTH, LOCATION_MIN_LENGTH, SEARCH_FIELDS, TITLE_MAX_LENGTH,
    TITLE_MIN_LENGTH,
};

/// Empty or whitespace-only values count as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn not_found() -> error::ServiceError {
    anyhow!("Issue not found").code(404)
}

fn validate(issue: CreateIssue) -> error::Result<(String, String, Category, String)> {
    let (Some(title), Some(description), Some(category), Some(location)) = (
        present(issue.title),
        present(issue.description),
        present(issue.category),
        present(issue.location),
    ) else {
        return Err(anyhow!("Missing required fields").code(400));
    };

    let title_length = title.chars().count();
    if title_length < TITLE_MIN_LENGTH {
        return Err(anyhow!("Title must be at least {} characters", TITLE_MIN_LENGTH).code(400));
    }
    if title_length > TITLE_MAX_LENGTH {
        return Err(anyhow!("Title must be less than {} characters", TITLE_MAX_LENGTH).code(400));
    }
    if description.chars().count() < DESCRIPTION_MIN_LENGTH {
        return Err(anyhow!(
            "Description must be at least {} characters",
            DESCRIPTION_MIN_LENGTH
        )
        .code(400));
    }
    if location.chars().count() < LOCATION_MIN_LENGTH {
        return Err(
            anyhow!("Location must be at least {} characters", LOCATION_MIN_LENGTH).code(400),
        );
    }
    let category: Category = category
        .parse()
        .map_err(|_| anyhow!("Invalid category").code(400))?;

    Ok((title, description, category, location))
}

fn build_query(query: IssueQuery) -> error::Result<Query> {
    let mut result = Query::new().newest_first();

    if let Some(category) = present(query.category) {
        let category: Category = category
            .parse()
            .map_err(|_| anyhow!("Invalid category").code(400))?;
        result = result.eq("category", category);
    }

    if let Some(status) = present(query.status) {
        let status: Status = status
            .parse()
            .map_err(|_| anyhow!("Invalid status").code(400))?;
        result = result.eq("status", status);
    }

    if let Some(search) = present(query.search) {
        result = result.contains(&SEARCH_FIELDS, &search);
    }

    Ok(result)
}

/// The data-access layer for issues. HTTP handlers and in-process callers
/// both go through it.
pub struct IssueService {
    context: Context,
}

impl IssueService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn list(&self, query: IssueQuery) -> error::Result<Vec<Issue>> {
        let query = build_query(query)?;
        let issues = self.context.try_get_repository::<Issue>()?;

        issues
            .find_many(&query)
            .await
            .context("Failed to fetch issues")
            .code(500)
    }

    pub async fn create(&self, issue: CreateIssue) -> error::Result<Issue> {
        let (title, description, category, location) = validate(issue)?;
        let issues = self.context.try_get_repository::<Issue>()?;

        let issue = Issue::new(title, description, category, location);
        let created = issues
            .insert(&issue)
            .await
            .context("Failed to create issue")
            .code(500)?;

        log::info!("Issue {} created in category {}", created.id, created.category);
        Ok(created)
    }

    pub async fn update_status(&self, id: &str, change: StatusChange) -> error::Result<Issue> {
        let Some(status) = present(change.status) else {
            return Err(anyhow!("Status is required").code(400));
        };
        let status: Status = status
            .parse()
            .map_err(|_| anyhow!("Invalid status").code(400))?;

        let Ok(id) = id.parse::<Uuid>() else {
            return Err(not_found());
        };
        let id = Bson::String(id.to_string());

        let issues = self.context.try_get_repository::<Issue>()?;

        let Some(issue) = issues
            .find(Issue::ID_FIELD, &id)
            .await
            .context("Failed to update issue status")
            .code(500)?
        else {
            return Err(not_found());
        };

        let Some(status) = issue.status.apply(status) else {
            return Err(anyhow!("Invalid status transition").code(400));
        };

        let updated = issues
            .update(Issue::ID_FIELD, &id, doc! {"status": status})
            .await
            .context("Failed to update issue status")
            .code(500)?
            .ok_or_else(not_found)?;

        log::info!("Issue {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn stats(&self) -> error::Result<IssueStats> {
        let issues = self.context.try_get_repository::<Issue>()?;

        let all = issues
            .find_many(&Query::new())
            .await
            .context("Failed to fetch stats")
            .code(500)?;

        Ok(IssueStats::collect(&all))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::{context::ServiceState, repository::test_repository::TestRepository};

    use super::*;

    fn service() -> IssueService {
        let mut state = ServiceState::new();
        state.insert::<Issue>(Arc::new(TestRepository::<Issue>::new()));
        IssueService::new(Context::new(Arc::new(state)))
    }

    fn create_request() -> CreateIssue {
        CreateIssue {
            title: Some("Broken streetlight on Elm St".to_string()),
            description: Some(
                "The streetlight at the corner of Elm and 3rd has been out for a week, creating a safety hazard at night."
                    .to_string(),
            ),
            category: Some("Lighting".to_string()),
            location: Some("Elm St & 3rd Ave".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_in_process_lifecycle() {
        let service = service();

        let created = service.create(create_request()).await.unwrap();
        assert_eq!(created.status, Status::Open);

        let resolved = service
            .update_status(
                &created.id.to_string(),
                StatusChange {
                    status: Some("Resolved".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resolved.status, Status::Resolved);
        assert_eq!(resolved.created_at, created.created_at);

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_issues, 1);
        assert_eq!(stats.resolved_issues, 1);
        assert_eq!(stats.category_breakdown[&Category::Lighting], 1);
    }

    #[actix_web::test]
    async fn test_malformed_stored_rows_are_skipped() {
        let good = Issue::new(
            "Broken streetlight on Elm St".to_string(),
            "The streetlight at the corner of Elm and 3rd is out.".to_string(),
            Category::Lighting,
            "Elm St & 3rd Ave".to_string(),
        );
        let repo = TestRepository::with_items(&[good.clone()]).unwrap();
        {
            let mut db = repo.db.lock().unwrap();
            let mut lowercase = mongodb::bson::to_document(&good).unwrap();
            lowercase.insert("id", Uuid::new_v4().to_string());
            lowercase.insert("status", "open");
            let mut missing = lowercase.clone();
            missing.insert("id", Uuid::new_v4().to_string());
            missing.insert("status", Bson::Null);
            db.push(lowercase);
            db.push(missing);
        }

        let mut state = ServiceState::new();
        state.insert::<Issue>(Arc::new(repo));
        let service = IssueService::new(Context::new(Arc::new(state)));

        let listed = service.list(IssueQuery::default()).await.unwrap();
        assert_eq!(listed, vec![good]);

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_issues, 1);
        assert_eq!(stats.total_issues, stats.open_issues + stats.resolved_issues);
    }

    #[test]
    fn test_validation_trims_and_counts_characters() {
        let mut request = create_request();
        request.title = Some("   Bad  ".to_string());
        let err = validate(request).unwrap_err();
        assert_eq!(err.code, 400);
        assert_eq!(err.message(), "Title must be at least 5 characters");

        let mut request = create_request();
        request.title = Some("é".repeat(100));
        assert!(validate(request).is_ok());

        let mut request = create_request();
        request.title = Some("x".repeat(101));
        assert_eq!(
            validate(request).unwrap_err().message(),
            "Title must be less than 100 characters"
        );
    }

    #[test]
    fn test_query_treats_empty_as_absent() {
        let query = build_query(IssueQuery {
            category: Some(String::new()),
            status: Some("  ".to_string()),
            search: None,
        })
        .unwrap();
        assert_eq!(query, Query::new().newest_first());
    }
}
