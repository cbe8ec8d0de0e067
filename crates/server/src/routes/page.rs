use actix_files::NamedFile;
use actix_web::{get, web};
use std::sync::Arc;

use crate::state::AppState;

/// Search page
#[get("/")]
pub async fn index(state: web::Data<Arc<AppState>>) -> actix_web::Result<NamedFile> {
    let page = state.config.static_dir.join("index.html");
    if !page.exists() {
        return Err(actix_web::error::ErrorNotFound("Page not found"));
    }
    Ok(NamedFile::open(page)?)
}
