use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use diesel::Connection;
use uuid::Uuid;

use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[get("/bookings")]
pub async fn list_bookings(
    pool: web::Data<DbPool>,
    query: web::Query<models::BookingListQuery>,
) -> Result<impl Responder, ApiError> {
    let email = query.into_inner().email;

    let bookings = web::block(move || -> Result<Vec<models::Booking>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::list_bookings(&mut conn, email.as_deref())?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(bookings))
}

#[get("/bookings/{booking_id}")]
pub async fn get_booking(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let booking_id = path.into_inner();

    let booking = web::block(move || -> Result<models::Booking, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::get_booking_by_id(&mut conn, booking_id)?)
    })
    .await?
    .map_err(|e| e.on_not_found("Booking not found"))?;

    Ok(HttpResponse::Ok().json(booking))
}

// Dates are checked against the stored stay; room counts are not re-checked against availability.
#[patch("/bookings/{booking_id}")]
pub async fn update_booking(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<models::UpdateBooking>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let booking_id = path.into_inner();
    let changes = form.into_inner();

    let booking = web::block(move || -> Result<models::Booking, ApiError> {
        let mut conn = pool.get()?;
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = actions::lock_booking_by_id(conn, booking_id)?;
            changes.validate_against(&current)?;
            Ok(actions::update_booking(conn, booking_id, &changes)?)
        })
    })
    .await?
    .map_err(|e| e.on_not_found("Booking not found"))?;

    Ok(HttpResponse::Ok().json(booking))
}

#[delete("/bookings/{booking_id}")]
pub async fn delete_booking(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let booking_id = path.into_inner();

    let deleted_count = web::block(move || -> Result<usize, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::delete_booking(&mut conn, booking_id)?)
    })
    .await??;

    if deleted_count == 0 {
        return Err(ApiError::NotFound("Booking not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(models::DeleteResponse { deleted_count }))
}
