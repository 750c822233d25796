use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[post("/reviews")]
pub async fn add_review(pool: web::Data<DbPool>, form: web::Json<models::NewReview>) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let form = form.into_inner();

    let review = web::block(move || -> Result<models::Review, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::insert_new_review(&mut conn, form)?)
    })
    .await??;

    Ok(HttpResponse::Created().json(review))
}

#[get("/reviews")]
pub async fn list_reviews(pool: web::Data<DbPool>) -> Result<impl Responder, ApiError> {
    let reviews = web::block(move || -> Result<Vec<models::Review>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::list_reviews(&mut conn)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(reviews))
}

#[get("/reviews/{review_id}")]
pub async fn get_review(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let review_id = path.into_inner();

    let review = web::block(move || -> Result<models::Review, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::get_review_by_id(&mut conn, review_id)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Review not found"))?;

    Ok(HttpResponse::Ok().json(review))
}

#[patch("/reviews/{review_id}")]
pub async fn update_review(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<models::UpdateReview>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let review_id = path.into_inner();
    let changes = form.into_inner();

    let review = web::block(move || -> Result<models::Review, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::update_review(&mut conn, review_id, &changes)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Review not found"))?;

    Ok(HttpResponse::Ok().json(review))
}

#[delete("/reviews/{review_id}")]
pub async fn delete_review(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let review_id = path.into_inner();

    let deleted_count = web::block(move || -> Result<usize, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::delete_review(&mut conn, review_id)?)
    })
    .await??;

    if deleted_count == 0 {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(models::DeleteResponse { deleted_count }))
}
