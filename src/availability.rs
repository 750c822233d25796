//! Room availability.
//!
//! A room type is available for a stay when its capacity minus the rooms held by
//! every overlapping booking still covers the requested count. Overlap is
//! inclusive on both ends, so a booking that ends on the check-in day or starts
//! on the check-out day still counts against capacity.
//!
//! The check only reads. On its own it is advisory: two callers can both see
//! free rooms before either inserts. `actions::create_booking_guarded` runs it
//! under a row lock on the room for the booking path.

use chrono::NaiveDate;
use diesel::{PgConnection, QueryResult};
use thiserror::Error;

use crate::actions;
use crate::models::{AvailabilityRequest, Booking, Room};

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Room type '{0}' not found")]
    RoomTypeNotFound(String),

    #[error("Not enough '{room_type}' rooms free to book {requested}")]
    Unavailable { room_type: String, requested: i32 },

    #[error(transparent)]
    Infrastructure(#[from] diesel::result::Error),
}

/// Where the availability check reads rooms and bookings from.
pub trait InventorySource {
    fn find_room_by_type(&mut self, room_type: &str) -> QueryResult<Option<Room>>;

    /// Holds the room row of `room_type` until the surrounding unit of work
    /// ends. `false` when no such room type exists.
    fn lock_room_type(&mut self, room_type: &str) -> QueryResult<bool>;

    /// Bookings of `room_type` for which [`overlaps`] holds against the stay.
    fn find_overlapping_bookings(
        &mut self,
        room_type: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> QueryResult<Vec<Booking>>;
}

impl InventorySource for PgConnection {
    fn find_room_by_type(&mut self, room_type: &str) -> QueryResult<Option<Room>> {
        actions::find_room_by_type(self, room_type)
    }

    fn lock_room_type(&mut self, room_type: &str) -> QueryResult<bool> {
        actions::lock_room_type(self, room_type)
    }

    fn find_overlapping_bookings(
        &mut self,
        room_type: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> QueryResult<Vec<Booking>> {
        actions::find_overlapping_bookings(self, room_type, check_in, check_out)
    }
}

/// Inclusive overlap between a booking `[start, end]` and a stay `[check_in, check_out]`.
pub fn overlaps(start: NaiveDate, end: NaiveDate, check_in: NaiveDate, check_out: NaiveDate) -> bool {
    start <= check_out && end >= check_in
}

pub fn check_availability<S>(source: &mut S, request: &AvailabilityRequest) -> Result<bool, AvailabilityError>
where
    S: InventorySource + ?Sized,
{
    let room = source
        .find_room_by_type(&request.room_type)?
        .ok_or_else(|| AvailabilityError::RoomTypeNotFound(request.room_type.clone()))?;

    let overlapping =
        source.find_overlapping_bookings(&request.room_type, request.check_in_date, request.check_out_date)?;

    let booked_rooms: i64 = overlapping.iter().map(|b| i64::from(b.rooms_booked)).sum();
    // May go negative when existing bookings already exceed capacity.
    let available_rooms = i64::from(room.total_rooms) - booked_rooms;

    log::debug!(
        "availability for '{}' {}..={}: total={} booked={} ({} bookings) requested={}",
        request.room_type,
        request.check_in_date,
        request.check_out_date,
        room.total_rooms,
        booked_rooms,
        overlapping.len(),
        request.rooms
    );

    Ok(available_rooms >= i64::from(request.rooms))
}

/// Locks the room type, checks the stay and runs `insert` only when the rooms
/// are free. Callers run this inside one transaction.
pub fn reserve<S, F>(source: &mut S, request: &AvailabilityRequest, insert: F) -> Result<Booking, AvailabilityError>
where
    S: InventorySource + ?Sized,
    F: FnOnce(&mut S) -> QueryResult<Booking>,
{
    if !source.lock_room_type(&request.room_type)? {
        return Err(AvailabilityError::RoomTypeNotFound(request.room_type.clone()));
    }

    if !check_availability(source, request)? {
        return Err(AvailabilityError::Unavailable {
            room_type: request.room_type.clone(),
            requested: request.rooms,
        });
    }

    Ok(insert(source)?)
}
