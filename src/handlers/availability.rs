use actix_web::{post, web, HttpResponse, Responder};

use crate::availability;
use crate::error::ApiError;
use crate::{actions, models, DbPool};

#[post("/check-availability")]
pub async fn check_availability(
    pool: web::Data<DbPool>,
    form: web::Json<models::AvailabilityRequest>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let request = form.into_inner();

    let available = web::block(move || -> Result<bool, ApiError> {
        let mut conn = pool.get()?;
        Ok(availability::check_availability(&mut *conn, &request)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(models::AvailabilityResponse { available }))
}

#[post("/book-room")]
pub async fn book_room(
    pool: web::Data<DbPool>,
    form: web::Json<models::NewBooking>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let new_booking = models::NewBookingInternal::from(form.into_inner());

    let booking = web::block(move || -> Result<models::Booking, ApiError> {
        let mut conn = pool.get()?;
        actions::create_booking_guarded(&mut conn, &new_booking).map_err(|e| {
            log::warn!("Booking of '{}' rejected: {}", new_booking.room_type, e);
            ApiError::from(e)
        })
    })
    .await??;

    log::info!(
        "Booked {} '{}' room(s) {}..={} as {}",
        booking.rooms_booked,
        booking.room_type,
        booking.start_date,
        booking.end_date,
        booking.booking_id
    );

    Ok(HttpResponse::Created().json(models::BookRoomResponse {
        success: true,
        message: "Booking successful".to_string(),
        booking_id: booking.booking_id,
    }))
}
