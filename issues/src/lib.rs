pub mod classifier;
pub mod constants;
pub mod handlers;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::{JsonPayloadError, QueryPayloadError},
    middleware, web, App, HttpRequest,
};
use anyhow::anyhow;
use common::{context::ServiceState, error::AddCode};

pub use handlers::{
    indexer::*,
    issues::*,
    stats::*,
    suggest::*,
};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    anyhow!("Invalid request body: {}", err).code(400).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    anyhow!("Invalid query string: {}", err).code(400).into()
}

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();

    #[allow(clippy::let_and_return)]
    let app = App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(ping)
        .service(get_issues)
        .service(post_issue)
        .service(patch_issue)
        .service(get_stats)
        .service(suggest);
    app
}
