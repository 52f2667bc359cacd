use actix_web::{get, HttpResponse};

#[utoipa::path(responses((status = 200, description = "Service is up")))]
#[get("/api/issues/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().finish()
}
