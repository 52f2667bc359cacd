use actix_web::{post, web::Json};
use anyhow::anyhow;

use common::{
    api::issues::{SuggestRequest, SuggestResponse},
    error::{self, AddCode},
};

use crate::classifier::suggest_category;

/// Category suggestion from the keyword heuristic; no model is involved.
#[utoipa::path(
    request_body = SuggestRequest,
    responses(
        (status = 200, description = "Suggested category", body = SuggestResponse),
        (status = 400, description = "Text is missing", body = common::error::ErrorBody)
    )
)]
#[post("/api/ai-suggest")]
pub async fn suggest(Json(data): Json<SuggestRequest>) -> error::Result<Json<SuggestResponse>> {
    let Some(text) = data.text.filter(|text| !text.trim().is_empty()) else {
        return Err(anyhow!("Text is required").code(400));
    };

    Ok(Json(SuggestResponse {
        category: suggest_category(&text),
    }))
}
