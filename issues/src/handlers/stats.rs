use actix_web::{get, web::Json};

use common::{
    context::Context,
    entities::stats::IssueStats,
    error,
};

use crate::service::issues::IssueService;

#[utoipa::path(
    responses(
        (status = 200, description = "Counts over every stored issue", body = IssueStats),
        (status = 500, description = "Store failure", body = common::error::ErrorBody)
    )
)]
#[get("/api/stats")]
pub async fn get_stats(context: Context) -> error::Result<Json<IssueStats>> {
    Ok(Json(IssueService::new(context).stats().await?))
}
