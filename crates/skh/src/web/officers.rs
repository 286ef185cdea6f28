//! Officer registry routes.

use actix_web::web::{delete, get, post, put, scope, Data, Json, Path, Query};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;

use crate::error::Result;
use crate::model::{OfficerDraft, OfficerRole};
use crate::service::Services;

const API_PATH: &str = "/petugas";

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(alias = "role")]
    tipe: Option<String>,
}

impl ListQuery {
    fn role(&self) -> Result<Option<OfficerRole>> {
        self.tipe
            .as_deref()
            .filter(|tipe| !tipe.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

/// Routes under `/petugas`:
///
/// * `GET /petugas?tipe=`: list, optionally only `Pejabat` or `Penerima`
/// * `POST /petugas`: register an officer
/// * `GET|PUT|DELETE /petugas/{id}`: read, edit, delete one officer
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(create))
        .route("/{id}", get().to(show))
        .route("/{id}", put().to(update))
        .route("/{id}", delete().to(remove))
}

async fn list(services: Data<Services>, query: Query<ListQuery>) -> Result<HttpResponse> {
    let view = services.officers.list(query.role()?).await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn create(services: Data<Services>, draft: Json<OfficerDraft>) -> Result<HttpResponse> {
    let officer = services.officers.create(draft.into_inner()).await?;
    Ok(HttpResponse::Created().json(officer))
}

async fn show(services: Data<Services>, id: Path<i64>) -> Result<HttpResponse> {
    let officer = services.officers.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(officer))
}

async fn update(
    services: Data<Services>,
    id: Path<i64>,
    draft: Json<OfficerDraft>,
) -> Result<HttpResponse> {
    let officer = services
        .officers
        .update(id.into_inner(), draft.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(officer))
}

async fn remove(services: Data<Services>, id: Path<i64>) -> Result<HttpResponse> {
    services.officers.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
