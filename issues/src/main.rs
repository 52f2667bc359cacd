use std::sync::Arc;

use actix_web::HttpServer;

use common::{
    context::ServiceState,
    entities::issue::Issue,
    repository::{mongo_repository::MongoRepository, postgrest_repository::PostgrestRepository},
    services::{StoreConfig, ISSUES_COLLECTION, ISSUES_DATABASE, PORT},
    verification::verify,
};
use issues::{constants::ISSUES_TABLE, create_app};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = StoreConfig::from_env()?;

    let mut state = ServiceState::new();
    match config {
        StoreConfig::Postgrest { url, key } => {
            log::info!("Using PostgREST store at {}", url);
            let repo: PostgrestRepository<Issue> =
                PostgrestRepository::new(state.client.clone(), &url, &key, ISSUES_TABLE);
            state.insert::<Issue>(Arc::new(repo));
        }
        StoreConfig::Mongo { uri } => {
            let checked = verify::<Issue>(&uri, &ISSUES_DATABASE, &ISSUES_COLLECTION).await?;
            log::info!(
                "Using MongoDB store, {} stored issues verified, {} unreadable",
                checked.readable,
                checked.unreadable
            );
            let repo: MongoRepository<Issue> =
                MongoRepository::new(&uri, &ISSUES_DATABASE, &ISSUES_COLLECTION).await?;
            state.insert::<Issue>(Arc::new(repo));
        }
    }
    let state = Arc::new(state);

    log::info!("Issues service listening on port {}", *PORT);
    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", *PORT))?
        .run()
        .await?;

    Ok(())
}
