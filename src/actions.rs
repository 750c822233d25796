use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::availability::{self, AvailabilityError};
use crate::models::{self, AvailabilityRequest};

// Rooms

pub fn insert_new_room(conn: &mut PgConnection, form: models::NewRoom) -> QueryResult<models::Room> {
    use crate::schema::rooms::dsl::rooms;

    diesel::insert_into(rooms)
        .values(models::NewRoomInternal::from(form))
        .get_result(conn)
}

pub fn list_rooms(conn: &mut PgConnection) -> QueryResult<Vec<models::Room>> {
    use crate::schema::rooms::dsl::{rooms, room_type};

    rooms.order(room_type.asc()).load(conn)
}

pub fn get_room_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::Room> {
    use crate::schema::rooms::dsl::rooms;

    rooms.find(id).first(conn)
}

pub fn find_room_by_type(conn: &mut PgConnection, rtype: &str) -> QueryResult<Option<models::Room>> {
    use crate::schema::rooms::dsl::{rooms, room_type};

    rooms
        .filter(room_type.eq(rtype))
        .first::<models::Room>(conn)
        .optional()
}

pub fn update_room(conn: &mut PgConnection, id: Uuid, changes: &models::UpdateRoom) -> QueryResult<models::Room> {
    use crate::schema::rooms::dsl::rooms;

    diesel::update(rooms.find(id)).set(changes).get_result(conn)
}

pub fn delete_room(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    use crate::schema::rooms::dsl::rooms;

    diesel::delete(rooms.find(id)).execute(conn)
}

// Bookings

pub fn find_overlapping_bookings(
    conn: &mut PgConnection,
    rtype: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> QueryResult<Vec<models::Booking>> {
    use crate::schema::bookings::dsl::{bookings, end_date, room_type, start_date};

    // Inclusive on both ends, same as availability::overlaps
    bookings
        .filter(room_type.eq(rtype))
        .filter(start_date.le(check_out).and(end_date.ge(check_in)))
        .load(conn)
}

pub fn lock_room_type(conn: &mut PgConnection, rtype: &str) -> QueryResult<bool> {
    use crate::schema::rooms::dsl::{room_id, room_type, rooms};

    let locked: Option<Uuid> = rooms
        .filter(room_type.eq(rtype))
        .select(room_id)
        .for_update()
        .first(conn)
        .optional()?;

    Ok(locked.is_some())
}

/// Inserts a booking only if the room type can still take it.
///
/// The room row is locked `FOR UPDATE` before the availability check, so
/// concurrent bookings of the same room type run the check one at a time and
/// the inventory cannot be overbooked through this path.
pub fn create_booking_guarded(
    conn: &mut PgConnection,
    new_booking: &models::NewBookingInternal,
) -> Result<models::Booking, AvailabilityError> {
    use crate::schema::bookings::dsl::bookings;

    let request = AvailabilityRequest {
        room_type: new_booking.room_type.clone(),
        check_in_date: new_booking.start_date,
        check_out_date: new_booking.end_date,
        rooms: new_booking.rooms_booked,
    };

    conn.transaction(|conn| {
        availability::reserve(conn, &request, |conn| {
            diesel::insert_into(bookings)
                .values(new_booking)
                .get_result::<models::Booking>(conn)
        })
    })
}

pub fn list_bookings(conn: &mut PgConnection, guest_email: Option<&str>) -> QueryResult<Vec<models::Booking>> {
    use crate::schema::bookings::dsl::{bookings, created_at, email};

    let mut query = bookings.into_boxed();
    if let Some(guest_email) = guest_email {
        query = query.filter(email.eq(guest_email.to_owned()));
    }

    query.order(created_at.desc()).load(conn)
}

pub fn get_booking_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::Booking> {
    use crate::schema::bookings::dsl::bookings;

    bookings.find(id).first(conn)
}

pub fn lock_booking_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::Booking> {
    use crate::schema::bookings::dsl::bookings;

    bookings.find(id).for_update().first(conn)
}

pub fn update_booking(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &models::UpdateBooking,
) -> QueryResult<models::Booking> {
    use crate::schema::bookings::dsl::bookings;

    diesel::update(bookings.find(id)).set(changes).get_result(conn)
}

pub fn delete_booking(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    use crate::schema::bookings::dsl::bookings;

    diesel::delete(bookings.find(id)).execute(conn)
}

// Users

pub fn insert_new_user(conn: &mut PgConnection, form: models::NewUser) -> QueryResult<models::User> {
    use crate::schema::users::dsl::users;

    diesel::insert_into(users)
        .values(models::NewUserInternal::from(form))
        .get_result(conn)
}

pub fn list_users(conn: &mut PgConnection) -> QueryResult<Vec<models::User>> {
    use crate::schema::users::dsl::{created_at, users};

    users.order(created_at.desc()).load(conn)
}

pub fn get_user_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::User> {
    use crate::schema::users::dsl::users;

    users.find(id).first(conn)
}

pub fn update_user(conn: &mut PgConnection, id: Uuid, changes: &models::UpdateUser) -> QueryResult<models::User> {
    use crate::schema::users::dsl::users;

    diesel::update(users.find(id)).set(changes).get_result(conn)
}

pub fn delete_user(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    use crate::schema::users::dsl::users;

    diesel::delete(users.find(id)).execute(conn)
}

// Reviews

pub fn insert_new_review(conn: &mut PgConnection, form: models::NewReview) -> QueryResult<models::Review> {
    use crate::schema::reviews::dsl::reviews;

    diesel::insert_into(reviews)
        .values(models::NewReviewInternal::from(form))
        .get_result(conn)
}

pub fn list_reviews(conn: &mut PgConnection) -> QueryResult<Vec<models::Review>> {
    use crate::schema::reviews::dsl::{created_at, reviews};

    reviews.order(created_at.desc()).load(conn)
}

pub fn get_review_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::Review> {
    use crate::schema::reviews::dsl::reviews;

    reviews.find(id).first(conn)
}

pub fn update_review(conn: &mut PgConnection, id: Uuid, changes: &models::UpdateReview) -> QueryResult<models::Review> {
    use crate::schema::reviews::dsl::reviews;

    diesel::update(reviews.find(id)).set(changes).get_result(conn)
}

pub fn delete_review(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    use crate::schema::reviews::dsl::reviews;

    diesel::delete(reviews.find(id)).execute(conn)
}

// Newsletters

pub fn insert_newsletter(conn: &mut PgConnection, form: models::NewNewsletter) -> QueryResult<models::Newsletter> {
    use crate::schema::newsletters::dsl::newsletters;

    diesel::insert_into(newsletters)
        .values(models::NewNewsletterInternal::from(form))
        .get_result(conn)
}

pub fn list_newsletters(conn: &mut PgConnection) -> QueryResult<Vec<models::Newsletter>> {
    use crate::schema::newsletters::dsl::{created_at, newsletters};

    newsletters.order(created_at.desc()).load(conn)
}

pub fn get_newsletter_by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<models::Newsletter> {
    use crate::schema::newsletters::dsl::newsletters;

    newsletters.find(id).first(conn)
}

pub fn delete_newsletter(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    use crate::schema::newsletters::dsl::newsletters;

    diesel::delete(newsletters.find(id)).execute(conn)
}
