// Route exports
pub mod vton;

use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpRequest, HttpResponse};

pub const TRY_ON_PATH: &str = "/v1/vton/idm";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(TRY_ON_PATH)
            .route(web::post().to(vton::try_on))
            .default_service(web::to(fallback)),
    )
    .default_service(web::to(fallback));
}

/// Adds `Access-Control-Allow-Origin: *` to every response
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}

/// Empty preflight answer, valid for any path
pub fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .insert_header((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

/// Anything that is not `POST /v1/vton/idm`
async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return preflight();
    }

    tracing::debug!("No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Not Found")
}
