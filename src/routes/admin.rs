/// Admin endpoints: hit-counter metrics and the dev-only reset.

use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::sync::Arc;

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::metrics::HitCounter;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<Arc<HitCounter>>) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body(format!(
        r#"<html>
<body>
  <h1>Welcome, Chirpd Admin</h1>
  <p>Chirpd has been visited {} times!</p>
</body>
</html>"#,
        counter.count()
    ))
}

/// POST /admin/reset
///
/// Resets the hit counter and deletes all users (refresh tokens and chirps
/// cascade). Only available when the platform is "dev"; forbidden anywhere
/// else.
pub async fn reset(
    counter: web::Data<Arc<HitCounter>>,
    pool: web::Data<PgPool>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if application.platform != "dev" {
        return Err(AuthError::Forbidden.into());
    }

    counter.reset();
    sqlx::query("DELETE FROM users").execute(pool.get_ref()).await?;

    tracing::warn!("dev reset: hit counter cleared and all users deleted");

    Ok(HttpResponse::Ok().finish())
}
