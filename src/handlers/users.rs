use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[post("/users")]
pub async fn add_user(pool: web::Data<DbPool>, form: web::Json<models::NewUser>) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let form = form.into_inner();

    let user = web::block(move || -> Result<models::User, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::insert_new_user(&mut conn, form)?)
    })
    .await?
    .map_err(|e| e.on_unique_violation("User already exists"))?;

    Ok(HttpResponse::Created().json(user))
}

#[get("/users")]
pub async fn list_users(pool: web::Data<DbPool>) -> Result<impl Responder, ApiError> {
    let users = web::block(move || -> Result<Vec<models::User>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::list_users(&mut conn)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{user_id}")]
pub async fn get_user(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let user_id = path.into_inner();

    let user = web::block(move || -> Result<models::User, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::get_user_by_id(&mut conn, user_id)?)
    })
    .await?
    .map_err(|e| e.on_not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(user))
}

#[patch("/users/{user_id}")]
pub async fn update_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<models::UpdateUser>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let user_id = path.into_inner();
    let changes = form.into_inner();

    let user = web::block(move || -> Result<models::User, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::update_user(&mut conn, user_id, &changes)?)
    })
    .await?
    .map_err(|e| e.on_not_found("User not found").on_unique_violation("User already exists"))?;

    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let user_id = path.into_inner();

    let deleted_count = web::block(move || -> Result<usize, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::delete_user(&mut conn, user_id)?)
    })
    .await??;

    if deleted_count == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(models::DeleteResponse { deleted_count }))
}
