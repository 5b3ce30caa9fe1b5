use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::Settings;
use crate::logger::LoggerMiddleware;
use crate::metrics::{HitCountMiddleware, HitCounter};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, handle_webhook, health_check, list_chirps,
    login, metrics, refresh, reset, revoke, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let auth_settings = web::Data::new(settings.auth);
    let application_settings = web::Data::new(settings.application);
    let hit_counter = Arc::new(HitCounter::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)
            // Shared state: pool, read-only settings, hit counter
            .app_data(connection.clone())
            .app_data(auth_settings.clone())
            .app_data(application_settings.clone())
            .app_data(web::Data::new(hit_counter.clone()))
            // API surface. Chirp/user mutations are guarded by a bearer
            // access token inside the handlers; reads are public.
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user)),
            )
            .service(
                web::resource("/api/chirps")
                    .route(web::get().to(list_chirps))
                    .route(web::post().to(create_chirp)),
            )
            .service(
                web::resource("/api/chirps/{id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp)),
            )
            // Webhook (API-key authenticated)
            .route("/api/webhooks", web::post().to(handle_webhook))
            // Admin
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
            // Static site, hits counted
            .service(
                web::scope("/app")
                    .wrap(HitCountMiddleware::new(hit_counter.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
