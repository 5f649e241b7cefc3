use actix_web::{
    http::header::AUTHORIZATION,
    web::{self, Data, Json, Path},
    HttpRequest, HttpResponse,
};
use llm_client::Credential;
use log::warn;

use crate::dto::{QueryRequest, QueryResponse};
use crate::error::Result;
use crate::middleware::extract_trace_id;
use crate::server::AppState;

/// Token from an `Authorization: Bearer <token>` header. The scheme name is
/// case-insensitive.
fn bearer_credential(req: &HttpRequest) -> Option<Credential> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(Credential::new(token)).filter(|c| !c.is_empty())
}

/// POST /v1/sessions/{id}/query
///
/// Uses the request's bearer token when present, otherwise the one stored on
/// the session. The session stays locked until the answer arrives.
pub async fn submit_query(
    req: HttpRequest,
    path: Path<String>,
    body: Json<QueryRequest>,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    let handle = state.registry.get(&path).await?;
    let mut session = handle.lock().await;

    let credential = bearer_credential(&req).unwrap_or_else(|| session.credential().clone());

    let answer = match state
        .controller
        .submit(&mut session, &body.query, &credential)
        .await
    {
        Ok(answer) => answer,
        Err(e) => {
            warn!(
                "Query failed for session {} (trace {}): {}",
                session.id(),
                extract_trace_id(&req).unwrap_or_default(),
                e
            );
            return Err(e.into());
        }
    };

    Ok(HttpResponse::Ok().json(QueryResponse {
        answer,
        transcript_len: session.transcript().len(),
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions/{id}/query").route(web::post().to(submit_query)));
}
