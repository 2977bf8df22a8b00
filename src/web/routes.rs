use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(handlers::json_error);

    cfg.app_data(json_config)
        .service(
            web::scope("/chat")
                .route("/completions", web::post().to(handlers::completions))
        )
        .route("/health", web::get().to(handlers::health));
}
