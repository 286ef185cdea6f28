//! Letter routes.
//!
//! Rejected submissions come back as 400 with the form echoed, so the
//! client can re-render what the officer typed.

use actix_web::web::{delete, get, post, put, scope, Data, Json, Path, Query};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::form::LetterForm;
use crate::service::Services;
use crate::view::LetterFormError;

const API_PATH: &str = "/surat";

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    q: Option<String>,
}

/// Routes under `/surat`:
///
/// * `GET /surat?q=`: list, optionally filtered by reporter name or number
/// * `POST /surat`: issue a new letter
/// * `GET|PUT|DELETE /surat/{id}`: read, edit, delete one letter
/// * `GET /surat/{id}/print`: the letter with letterhead and officers
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(create))
        .route("/{id}", get().to(show))
        .route("/{id}", put().to(update))
        .route("/{id}", delete().to(remove))
        .route("/{id}/print", get().to(print))
}

async fn list(services: Data<Services>, query: Query<ListQuery>) -> Result<HttpResponse> {
    let view = services.letters.list(query.into_inner().q).await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn create(services: Data<Services>, form: Json<LetterForm>) -> Result<HttpResponse> {
    let form = form.into_inner();
    match services.letters.issue(form.clone().into_draft()).await {
        Ok(letter) => Ok(HttpResponse::Created().json(letter)),
        Err(e) => reject(e, form),
    }
}

async fn show(services: Data<Services>, id: Path<i64>) -> Result<HttpResponse> {
    let letter = services.letters.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(letter))
}

async fn update(
    services: Data<Services>,
    id: Path<i64>,
    form: Json<LetterForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    match services
        .letters
        .update(id.into_inner(), form.clone().into_draft())
        .await
    {
        Ok(letter) => Ok(HttpResponse::Ok().json(letter)),
        Err(e) => reject(e, form),
    }
}

async fn remove(services: Data<Services>, id: Path<i64>) -> Result<HttpResponse> {
    services.letters.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn print(services: Data<Services>, id: Path<i64>) -> Result<HttpResponse> {
    let view = services.letters.print_view(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

fn reject(error: Error, form: LetterForm) -> Result<HttpResponse> {
    if !error.is_validation() {
        return Err(error);
    }
    Ok(HttpResponse::BadRequest().json(LetterFormError {
        error: error.to_string(),
        form,
    }))
}
