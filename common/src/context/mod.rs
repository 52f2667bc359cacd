use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};

use crate::error::{self, ServiceError};

pub use self::effectfull_context::{EffectfullContext, ServiceState};
pub mod effectfull_context;

/// Per-request handle on the shared service state. Handlers receive it as an
/// extractor; in-process callers build one with [`Context::new`].
pub type Context = EffectfullContext;

impl EffectfullContext {
    pub fn new(state: Arc<ServiceState>) -> Self {
        EffectfullContext(state)
    }
}

impl FromRequest for EffectfullContext {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        fn from_request_inner(req: &HttpRequest, _payload: &mut Payload) -> error::Result<Context> {
            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(anyhow::anyhow!("No state provided".to_string()).into());
            };

            Ok(EffectfullContext(Arc::clone(state)))
        }
        let result = from_request_inner(req, payload);

        Box::pin(async move { result })
    }
}
