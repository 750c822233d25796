use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::{deserialize::{self, FromSql}, pg::{Pg, PgValue}, serialize::{self, Output, ToSql}, sql_types::Text, AsChangeset, Insertable, Selectable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::schema::{bookings, newsletters, reviews, rooms, users};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("email is not a valid address".to_string()))
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_positive(value: i32, field: &str) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::BadRequest(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

fn require_date_order(start: NaiveDate, end: NaiveDate, start_field: &str, end_field: &str) -> Result<(), ApiError> {
    if end < start {
        return Err(ApiError::BadRequest(format!("{} must not be before {}", end_field, start_field)));
    }
    Ok(())
}

fn require_rating(rating: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::BadRequest("rating must be between 1 and 5".to_string()));
    }
    Ok(())
}

// Rooms

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = rooms)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id")]
    pub room_id: Uuid,
    #[serde(rename = "type")]
    pub room_type: String,
    pub total_rooms: i32,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    #[serde(rename = "type")]
    pub room_type: String,
    pub total_rooms: i32,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
}

impl NewRoom {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty(&self.room_type, "type")?;
        if self.total_rooms < 0 {
            return Err(ApiError::BadRequest("totalRooms must not be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoomInternal {
    pub room_id: Uuid,
    pub room_type: String,
    pub total_rooms: i32,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
}

impl From<NewRoom> for NewRoomInternal {
    fn from(form: NewRoom) -> Self {
        Self {
            room_id: Uuid::new_v4(),
            room_type: form.room_type,
            total_rooms: form.total_rooms,
            description: form.description,
            price_per_night: form.price_per_night,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = rooms)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub total_rooms: Option<i32>,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
}

impl UpdateRoom {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.room_type.is_none()
            && self.total_rooms.is_none()
            && self.description.is_none()
            && self.price_per_night.is_none()
        {
            return Err(ApiError::BadRequest("no fields to update".to_string()));
        }
        if let Some(room_type) = &self.room_type {
            require_non_empty(room_type, "type")?;
        }
        if matches!(self.total_rooms, Some(total) if total < 0) {
            return Err(ApiError::BadRequest("totalRooms must not be negative".to_string()));
        }
        Ok(())
    }
}

// Bookings

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = crate::schema::sql_types::BookingStatus)]
pub enum BookingStatus {
    PENDING,
    CONFIRMED,
    CANCELED,
}

impl ToSql<crate::schema::sql_types::BookingStatus, Pg> for BookingStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match *self {
            BookingStatus::PENDING => "PENDING",
            BookingStatus::CONFIRMED => "CONFIRMED",
            BookingStatus::CANCELED => "CANCELED",
        };
        <str as ToSql<Text, Pg>>::to_sql(s, out)
    }
}

impl FromSql<crate::schema::sql_types::BookingStatus, Pg> for BookingStatus {
    fn from_sql(bytes: PgValue) -> deserialize::Result<Self> {
        match <String as FromSql<Text, Pg>>::from_sql(bytes)?.as_str() {
            "PENDING" => Ok(BookingStatus::PENDING),
            "CONFIRMED" => Ok(BookingStatus::CONFIRMED),
            "CANCELED" => Ok(BookingStatus::CANCELED),
            s => Err(format!("Unrecognized booking status: {}", s).into()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = bookings)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub booking_id: Uuid,
    pub email: String,
    pub room_type: String,
    pub rooms_booked: i32,
    pub num_of_persons: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /book-room`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub email: String,
    pub room_type: String,
    pub rooms_booked: i32,
    pub num_of_persons: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        require_non_empty(&self.room_type, "roomType")?;
        require_positive(self.rooms_booked, "roomsBooked")?;
        require_positive(self.num_of_persons, "numOfPersons")?;
        require_date_order(self.start_date, self.end_date, "startDate", "endDate")
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingInternal {
    pub booking_id: Uuid,
    pub email: String,
    pub room_type: String,
    pub rooms_booked: i32,
    pub num_of_persons: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
}

impl From<NewBooking> for NewBookingInternal {
    fn from(form: NewBooking) -> Self {
        Self {
            booking_id: Uuid::new_v4(),
            email: form.email,
            room_type: form.room_type,
            rooms_booked: form.rooms_booked,
            num_of_persons: form.num_of_persons,
            start_date: form.start_date,
            end_date: form.end_date,
            status: BookingStatus::PENDING,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = bookings)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBooking {
    pub email: Option<String>,
    pub room_type: Option<String>,
    pub rooms_booked: Option<i32>,
    pub num_of_persons: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

impl UpdateBooking {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.room_type.is_none()
            && self.rooms_booked.is_none()
            && self.num_of_persons.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::BadRequest("no fields to update".to_string()));
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(room_type) = &self.room_type {
            require_non_empty(room_type, "roomType")?;
        }
        if let Some(rooms_booked) = self.rooms_booked {
            require_positive(rooms_booked, "roomsBooked")?;
        }
        if let Some(num_of_persons) = self.num_of_persons {
            require_positive(num_of_persons, "numOfPersons")?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            require_date_order(start, end, "startDate", "endDate")?;
        }
        Ok(())
    }

    /// Checks the stay this patch leaves behind once merged into `current`.
    pub fn validate_against(&self, current: &Booking) -> Result<(), ApiError> {
        let start = self.start_date.unwrap_or(current.start_date);
        let end = self.end_date.unwrap_or(current.end_date);
        require_date_order(start, end, "startDate", "endDate")
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRoomResponse {
    pub success: bool,
    pub message: String,
    pub booking_id: Uuid,
}

// Availability

/// Body of `POST /check-availability`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub room_type: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub rooms: i32,
}

impl AvailabilityRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty(&self.room_type, "roomType")?;
        require_positive(self.rooms, "rooms")?;
        require_date_order(self.check_in_date, self.check_out_date, "checkInDate", "checkOutDate")
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

// Users

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        if let Some(role) = &self.role {
            require_non_empty(role, "role")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserInternal {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: String,
}

impl From<NewUser> for NewUserInternal {
    fn from(form: NewUser) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email: form.email,
            name: form.name,
            photo_url: form.photo_url,
            role: form.role.unwrap_or_else(|| "user".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_none() && self.name.is_none() && self.photo_url.is_none() && self.role.is_none() {
            return Err(ApiError::BadRequest("no fields to update".to_string()));
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(role) = &self.role {
            require_non_empty(role, "role")?;
        }
        Ok(())
    }
}

// Reviews

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = reviews)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub review_id: Uuid,
    pub email: String,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub room_type: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub email: String,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub room_type: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        require_non_empty(&self.name, "name")?;
        require_rating(self.rating)?;
        require_non_empty(&self.comment, "comment")
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewInternal {
    pub review_id: Uuid,
    pub email: String,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub room_type: Option<String>,
}

impl From<NewReview> for NewReviewInternal {
    fn from(form: NewReview) -> Self {
        Self {
            review_id: Uuid::new_v4(),
            email: form.email,
            name: form.name,
            rating: form.rating,
            comment: form.comment,
            room_type: form.room_type,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = reviews)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReview {
    pub name: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub room_type: Option<String>,
}

impl UpdateReview {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_none() && self.rating.is_none() && self.comment.is_none() && self.room_type.is_none() {
            return Err(ApiError::BadRequest("no fields to update".to_string()));
        }
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(rating) = self.rating {
            require_rating(rating)?;
        }
        if let Some(comment) = &self.comment {
            require_non_empty(comment, "comment")?;
        }
        Ok(())
    }
}

// Newsletters

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = newsletters)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    #[serde(rename = "_id")]
    pub newsletter_id: Uuid,
    pub email: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNewsletter {
    pub email: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = newsletters)]
pub struct NewNewsletterInternal {
    pub newsletter_id: Uuid,
    pub email: String,
}

impl From<NewNewsletter> for NewNewsletterInternal {
    fn from(form: NewNewsletter) -> Self {
        Self {
            newsletter_id: Uuid::new_v4(),
            email: form.email,
        }
    }
}

// Shared responses

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn room_serializes_with_document_field_names() {
        let room = Room {
            room_id: Uuid::nil(),
            room_type: "Deluxe".to_string(),
            total_rooms: 5,
            description: None,
            price_per_night: Some(120.0),
            created_at: None,
        };
        let value = serde_json::to_value(&room).unwrap();
        assert_eq!(value["type"], "Deluxe");
        assert_eq!(value["totalRooms"], 5);
        assert_eq!(value["pricePerNight"], 120.0);
        assert!(value.get("_id").is_some());
        assert!(value.get("roomType").is_none());
    }

    #[test]
    fn availability_request_reads_camel_case_dates() {
        let request: AvailabilityRequest = serde_json::from_value(json!({
            "roomType": "Deluxe",
            "checkInDate": "2024-06-03",
            "checkOutDate": "2024-06-04",
            "rooms": 1
        }))
        .unwrap();
        assert_eq!(request.check_in_date, date("2024-06-03"));
        assert_eq!(request.check_out_date, date("2024-06-04"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn availability_request_rejects_reversed_dates_and_zero_rooms() {
        let mut request = AvailabilityRequest {
            room_type: "Deluxe".to_string(),
            check_in_date: date("2024-06-05"),
            check_out_date: date("2024-06-04"),
            rooms: 1,
        };
        assert!(request.validate().is_err());

        request.check_out_date = date("2024-06-05");
        assert!(request.validate().is_ok());

        request.rooms = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn booking_status_uses_upper_case_names() {
        assert_eq!(serde_json::to_value(BookingStatus::CONFIRMED).unwrap(), "CONFIRMED");
        let status: BookingStatus = serde_json::from_value(json!("CANCELED")).unwrap();
        assert_eq!(status, BookingStatus::CANCELED);
    }

    #[test]
    fn new_booking_starts_pending_with_fresh_id() {
        let form = NewBooking {
            email: "guest@example.com".to_string(),
            room_type: "Deluxe".to_string(),
            rooms_booked: 2,
            num_of_persons: 3,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-05"),
        };
        assert!(form.validate().is_ok());
        let first = NewBookingInternal::from(form.clone());
        let second = NewBookingInternal::from(form);
        assert_eq!(first.status, BookingStatus::PENDING);
        assert_ne!(first.booking_id, second.booking_id);
    }

    #[test]
    fn new_booking_rejects_bad_email() {
        let form = NewBooking {
            email: "not-an-email".to_string(),
            room_type: "Deluxe".to_string(),
            rooms_booked: 1,
            num_of_persons: 1,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-01"),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn empty_changesets_are_rejected() {
        assert!(UpdateBooking::default().validate().is_err());
        assert!(UpdateRoom::default().validate().is_err());
        assert!(UpdateUser::default().validate().is_err());
        assert!(UpdateReview::default().validate().is_err());

        let patch: UpdateBooking = serde_json::from_value(json!({ "status": "CONFIRMED" })).unwrap();
        assert!(!patch.is_empty());
        assert!(patch.validate().is_ok());
    }

    fn stored_booking(start: &str, end: &str) -> Booking {
        Booking {
            booking_id: Uuid::new_v4(),
            email: "guest@example.com".to_string(),
            room_type: "Deluxe".to_string(),
            rooms_booked: 5,
            num_of_persons: 2,
            start_date: date(start),
            end_date: date(end),
            status: BookingStatus::CONFIRMED,
            created_at: None,
        }
    }

    #[test]
    fn one_sided_date_patch_is_checked_against_stored_stay() {
        let current = stored_booking("2024-06-01", "2024-06-05");

        let patch: UpdateBooking = serde_json::from_value(json!({ "endDate": "2024-05-01" })).unwrap();
        assert!(patch.validate().is_ok());
        let err = patch.validate_against(&current).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg == "endDate must not be before startDate"));

        let patch: UpdateBooking = serde_json::from_value(json!({ "startDate": "2024-06-06" })).unwrap();
        assert!(patch.validate_against(&current).is_err());

        let patch: UpdateBooking = serde_json::from_value(json!({ "startDate": "2024-06-05" })).unwrap();
        assert!(patch.validate_against(&current).is_ok());

        let patch: UpdateBooking = serde_json::from_value(json!({ "status": "CANCELED" })).unwrap();
        assert!(patch.validate_against(&current).is_ok());
    }

    #[test]
    fn review_patch_rejects_blank_name() {
        let patch = UpdateReview {
            name: Some("  ".to_string()),
            ..UpdateReview::default()
        };
        let err = patch.validate().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg == "name must not be empty"));

        let patch = UpdateReview {
            name: Some("Guest".to_string()),
            ..UpdateReview::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let mut review = NewReview {
            email: "guest@example.com".to_string(),
            name: "Guest".to_string(),
            rating: 6,
            comment: "Lovely view".to_string(),
            room_type: None,
        };
        assert!(review.validate().is_err());
        review.rating = 5;
        assert!(review.validate().is_ok());
    }

    #[test]
    fn new_user_defaults_role() {
        let user = NewUserInternal::from(NewUser {
            email: "guest@example.com".to_string(),
            name: None,
            photo_url: None,
            role: None,
        });
        assert_eq!(user.role, "user");
    }
}
