use std::sync::Arc;

use type_map::concurrent::TypeMap;

use crate::error::{self, AddCode};
use crate::repository::RepositoryObject;

pub struct ServiceState {
    pub repositories: TypeMap,
    pub client: reqwest::Client,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            repositories: TypeMap::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }
}

#[derive(Clone)]
pub struct EffectfullContext(pub Arc<ServiceState>);

impl EffectfullContext {
    pub fn get_repository<T: 'static>(&self) -> Option<RepositoryObject<T>> {
        self.0.repositories.get::<RepositoryObject<T>>().cloned()
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.get_repository::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "Repository for type {} not found",
                std::any::type_name::<T>()
            )
            .code(500)
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.0.client
    }
}
