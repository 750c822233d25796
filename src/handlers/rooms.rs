use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[post("/rooms")]
pub async fn add_room(pool: web::Data<DbPool>, form: web::Json<models::NewRoom>) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let form = form.into_inner();

    let room = web::block(move || -> Result<models::Room, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::insert_new_room(&mut conn, form)?)
    })
    .await?
    .map_err(|e| e.on_unique_violation("room type already exists"))?;

    log::info!("Added room type '{}' with {} rooms", room.room_type, room.total_rooms);

    Ok(HttpResponse::Created().json(room))
}

#[get("/rooms")]
pub async fn list_rooms(pool: web::Data<DbPool>) -> Result<impl Responder, ApiError> {
    let rooms = web::block(move || -> Result<Vec<models::Room>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::list_rooms(&mut conn)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(rooms))
}

#[get("/rooms/{room_id}")]
pub async fn get_room(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let room_id = path.into_inner();

    let room = web::block(move || -> Result<models::Room, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::get_room_by_id(&mut conn, room_id)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Room not found"))?;

    Ok(HttpResponse::Ok().json(room))
}

#[patch("/rooms/{room_id}")]
pub async fn update_room(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<models::UpdateRoom>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let room_id = path.into_inner();
    let changes = form.into_inner();

    let room = web::block(move || -> Result<models::Room, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::update_room(&mut conn, room_id, &changes)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Room not found").on_unique_violation("room type already exists"))?;

    Ok(HttpResponse::Ok().json(room))
}

#[delete("/rooms/{room_id}")]
pub async fn delete_room(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let room_id = path.into_inner();

    let deleted_count = web::block(move || -> Result<usize, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::delete_room(&mut conn, room_id)?)
    })
    .await??;

    if deleted_count == 0 {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(models::DeleteResponse { deleted_count }))
}
