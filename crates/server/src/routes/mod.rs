pub mod page;
pub mod search;
pub mod system;

use actix_web::web;

/// Register API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(search::json_config())
        .service(search::search)
        .service(system::health)
        .service(page::index);
}
