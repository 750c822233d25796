use actix_web::{delete, get, post, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[post("/newsletters")]
pub async fn subscribe(pool: web::Data<DbPool>, form: web::Json<models::NewNewsletter>) -> Result<impl Responder, ApiError> {
    models::validate_email(&form.email)?;
    let form = form.into_inner();

    let subscription = web::block(move || -> Result<models::Newsletter, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::insert_newsletter(&mut conn, form)?)
    })
    .await?
    .map_err(|e| e.on_unique_violation("email is already subscribed"))?;

    Ok(HttpResponse::Created().json(subscription))
}

#[get("/newsletters")]
pub async fn list_subscriptions(pool: web::Data<DbPool>) -> Result<impl Responder, ApiError> {
    let subscriptions = web::block(move || -> Result<Vec<models::Newsletter>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::list_newsletters(&mut conn)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(subscriptions))
}

#[get("/newsletters/{newsletter_id}")]
pub async fn get_subscription(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let newsletter_id = path.into_inner();

    let subscription = web::block(move || -> Result<models::Newsletter, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::get_newsletter_by_id(&mut conn, newsletter_id)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Subscription not found"))?;

    Ok(HttpResponse::Ok().json(subscription))
}

#[delete("/newsletters/{newsletter_id}")]
pub async fn unsubscribe(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let newsletter_id = path.into_inner();

    let deleted_count = web::block(move || -> Result<usize, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::delete_newsletter(&mut conn, newsletter_id)?)
    })
    .await??;

    if deleted_count == 0 {
        return Err(ApiError::NotFound("Subscription not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(models::DeleteResponse { deleted_count }))
}
