use actix_web::{web, HttpResponse, Responder};
use chat_core::INSTRUCTIONS;
use serde_json::json;

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn instructions() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/markdown; charset=utf-8")
        .body(INSTRUCTIONS)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/instructions").route(web::get().to(instructions)));
}
