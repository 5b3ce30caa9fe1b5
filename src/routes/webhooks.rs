/// Payment-provider webhook.
///
/// Authenticated with a shared API key (`Authorization: ApiKey <key>`), not
/// a user token. Only the `user.upgraded` event is meaningful; everything
/// else is acknowledged and dropped.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::api_key;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// POST /api/webhooks
pub async fn handle_webhook(
    req: HttpRequest,
    form: web::Json<WebhookEvent>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let key = api_key(req.headers())?;
    if key != auth.webhook_api_key {
        tracing::warn!("webhook called with incorrect api key");
        return Err(AuthError::MissingCredential.into());
    }

    if form.event != "user.upgraded" {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&form.data.user_id)
        .map_err(|_| ValidationError::InvalidFormat("user_id"))?;

    let result = sqlx::query("UPDATE users SET is_premium = true, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("user not found".to_string()).into());
    }

    tracing::info!(user_id = %user_id, "user upgraded to premium");

    Ok(HttpResponse::NoContent().finish())
}
