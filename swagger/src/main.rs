use std::{error::Error, net::Ipv4Addr};

use actix_web::{middleware::Logger, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::{SwaggerUi, Url};

#[derive(OpenApi)]
#[openapi(
    paths(
        issues::get_issues,
        issues::post_issue,
        issues::patch_issue,
        issues::get_stats,
        issues::suggest,
        issues::ping,
    ),
    components(schemas(
        common::entities::issue::Issue,
        common::entities::issue::Category,
        common::entities::issue::Status,
        common::entities::stats::IssueStats,
        common::api::issues::CreateIssue,
        common::api::issues::StatusChange,
        common::api::issues::SuggestRequest,
        common::api::issues::SuggestResponse,
        common::error::ErrorBody,
    ))
)]
struct IssuesServiceDoc;

#[actix_web::main]
async fn main() -> Result<(), impl Error> {
    env_logger::init();

    log::info!("Serving API docs on port 8080");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").urls(vec![(
                Url::new("issues", "/api-doc/issues.json"),
                IssuesServiceDoc::openapi(),
            )]))
    })
    .bind((Ipv4Addr::UNSPECIFIED, 8080))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = serde_json::to_value(IssuesServiceDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/api/issues",
            "/api/issues/{id}",
            "/api/stats",
            "/api/ai-suggest",
            "/api/issues/ping",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert!(paths["/api/issues/{id}"]["patch"].is_object());
    }
}
