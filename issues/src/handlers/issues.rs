use actix_web::{
    get, patch, post,
    web::{self, Json},
    HttpResponse,
};

use common::{
    api::issues::{CreateIssue, IssueQuery, StatusChange},
    context::Context,
    entities::issue::Issue,
    error,
};

use crate::service::issues::IssueService;

#[utoipa::path(
    params(IssueQuery),
    responses(
        (status = 200, description = "Matching issues, newest first", body = [Issue]),
        (status = 400, description = "Unknown category or status", body = common::error::ErrorBody),
        (status = 500, description = "Store failure", body = common::error::ErrorBody)
    )
)]
#[get("/api/issues")]
pub async fn get_issues(
    context: Context,
    query: web::Query<IssueQuery>,
) -> error::Result<Json<Vec<Issue>>> {
    Ok(Json(
        IssueService::new(context).list(query.into_inner()).await?,
    ))
}

#[utoipa::path(
    request_body = CreateIssue,
    responses(
        (status = 201, description = "Stored issue", body = Issue),
        (status = 400, description = "Missing or invalid fields", body = common::error::ErrorBody),
        (status = 500, description = "Store failure", body = common::error::ErrorBody)
    )
)]
#[post("/api/issues")]
pub async fn post_issue(
    context: Context,
    Json(data): Json<CreateIssue>,
) -> error::Result<HttpResponse> {
    let issue = IssueService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(issue))
}

#[utoipa::path(
    params(("id" = String, Path, description = "Issue id")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Updated issue", body = Issue),
        (status = 400, description = "Missing, unknown or disallowed status", body = common::error::ErrorBody),
        (status = 404, description = "Issue not found", body = common::error::ErrorBody),
        (status = 500, description = "Store failure", body = common::error::ErrorBody)
    )
)]
#[patch("/api/issues/{id}")]
pub async fn patch_issue(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<StatusChange>,
) -> error::Result<Json<Issue>> {
    Ok(Json(
        IssueService::new(context)
            .update_status(&id.into_inner(), data)
            .await?,
    ))
}
