use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web::{self, Bytes, Data, Json, Path, Query},
    HttpResponse,
};
use llm_client::Credential;
use log::info;

use crate::dto::{
    FileUploadDTO, SessionCreatedDTO, SetCredentialRequest, TranscriptDTO, TranscriptParams,
    UploadParams,
};
use crate::error::{AppError, Result};
use crate::server::AppState;

/// POST /v1/sessions
pub async fn create_session(state: Data<AppState>) -> Result<HttpResponse> {
    let session_id = state.registry.create().await;
    Ok(HttpResponse::Created().json(SessionCreatedDTO { session_id }))
}

/// DELETE /v1/sessions/{id}
pub async fn terminate_session(path: Path<String>, state: Data<AppState>) -> Result<HttpResponse> {
    let id = path.into_inner();
    if state.registry.terminate(&id).await {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(session_manager::SessionError::NotFound(id).into())
    }
}

/// PUT /v1/sessions/{id}/credential
pub async fn set_credential(
    path: Path<String>,
    body: Json<SetCredentialRequest>,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    let handle = state.registry.get(&path).await?;
    handle
        .lock()
        .await
        .set_credential(Credential::new(body.into_inner().api_key));
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /v1/sessions/{id}/credential
pub async fn clear_credential(path: Path<String>, state: Data<AppState>) -> Result<HttpResponse> {
    let handle = state.registry.get(&path).await?;
    handle.lock().await.clear_credential();
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /v1/sessions/{id}/file?name=<file name>
///
/// The request body is the raw file.
pub async fn upload_file(
    path: Path<String>,
    params: Query<UploadParams>,
    body: Bytes,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    let file_name = params
        .into_inner()
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(AppError::MissingParameter("name"))?;

    let handle = state.registry.get(&path).await?;
    let mut session = handle.lock().await;

    info!("Upload of '{}' ({} bytes) to session {}", file_name, body.len(), session.id());
    let change = session.set_file(&file_name, body.to_vec())?;

    Ok(HttpResponse::Ok().json(FileUploadDTO {
        file_name,
        change,
        phase: session.phase(),
        transcript_len: session.transcript().len(),
    }))
}

/// GET /v1/sessions/{id}/transcript
pub async fn get_transcript(
    path: Path<String>,
    params: Query<TranscriptParams>,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    let handle = state.registry.get(&path).await?;
    let session = handle.lock().await;

    let messages = session
        .transcript()
        .iter()
        .filter(|m| params.include_system || !m.is_system())
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(TranscriptDTO {
        phase: session.phase(),
        file_name: session.file().map(|f| f.name().to_string()),
        messages,
    }))
}

/// GET /v1/sessions/{id}/result
pub async fn download_result(path: Path<String>, state: Data<AppState>) -> Result<HttpResponse> {
    let handle = state.registry.get(&path).await?;
    let export = handle
        .lock()
        .await
        .export_latest()
        .ok_or(AppError::NoResult)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.file_name.to_string())],
        })
        .body(export.content))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions").route(web::post().to(create_session)))
        .service(web::resource("/sessions/{id}").route(web::delete().to(terminate_session)))
        .service(
            web::resource("/sessions/{id}/credential")
                .route(web::put().to(set_credential))
                .route(web::delete().to(clear_credential)),
        )
        .service(web::resource("/sessions/{id}/file").route(web::put().to(upload_file)))
        .service(web::resource("/sessions/{id}/transcript").route(web::get().to(get_transcript)))
        .service(web::resource("/sessions/{id}/result").route(web::get().to(download_result)));
}
