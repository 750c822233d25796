use actix_web::{error, get, web, HttpResponse, Responder};

use crate::models::ApiResponse;

pub mod availability;
pub mod bookings;
pub mod newsletters;
pub mod reviews;
pub mod rooms;
pub mod users;

#[get("/")]
async fn home() -> impl Responder {
    "Hello World!"
}

/// JSON extractor config: undecodable bodies answer 400 `{message}` instead of
/// actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        let response = match err {
            error::JsonPayloadError::ContentType => {
                HttpResponse::UnsupportedMediaType().body("Unsupported Media Type")
            }
            error::JsonPayloadError::Deserialize(ref err) => {
                HttpResponse::BadRequest().json(ApiResponse { message: err.to_string() })
            }
            _ => HttpResponse::BadRequest().json(ApiResponse { message: detail }),
        };
        error::InternalError::from_response(err, response).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(availability::check_availability)
        .service(availability::book_room)
        .service(bookings::list_bookings)
        .service(bookings::get_booking)
        .service(bookings::update_booking)
        .service(bookings::delete_booking)
        .service(users::add_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(reviews::add_review)
        .service(reviews::list_reviews)
        .service(reviews::get_review)
        .service(reviews::update_review)
        .service(reviews::delete_review)
        .service(rooms::add_room)
        .service(rooms::list_rooms)
        .service(rooms::get_room)
        .service(rooms::update_room)
        .service(rooms::delete_room)
        .service(newsletters::subscribe)
        .service(newsletters::list_subscriptions)
        .service(newsletters::get_subscription)
        .service(newsletters::unsubscribe);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use diesel::{r2d2, PgConnection};
    use serde_json::{json, Value};

    use crate::DbPool;

    // Never connects; these requests are all rejected before a connection is checked out.
    fn unreachable_pool() -> DbPool {
        let manager = r2d2::ConnectionManager::<PgConnection>::new("postgres://localhost:1/unused");
        r2d2::Pool::builder().min_idle(Some(0)).build_unchecked(manager)
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(unreachable_pool()))
                    .app_data(json_config())
                    .configure(configure),
            )
            .await
        };
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let app = test_app!();
        let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn home_says_hello() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"Hello World!"));
    }

    #[actix_web::test]
    async fn check_availability_rejects_non_positive_rooms() {
        let (status, body) = post_json(
            "/check-availability",
            json!({
                "roomType": "Deluxe",
                "checkInDate": "2024-06-03",
                "checkOutDate": "2024-06-04",
                "rooms": 0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "rooms must be greater than 0");
    }

    #[actix_web::test]
    async fn check_availability_rejects_reversed_stay() {
        let (status, body) = post_json(
            "/check-availability",
            json!({
                "roomType": "Deluxe",
                "checkInDate": "2024-06-05",
                "checkOutDate": "2024-06-04",
                "rooms": 1
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "checkOutDate must not be before checkInDate");
    }

    #[actix_web::test]
    async fn check_availability_rejects_malformed_dates() {
        let (status, body) = post_json(
            "/check-availability",
            json!({
                "roomType": "Deluxe",
                "checkInDate": "June 3rd",
                "checkOutDate": "2024-06-04",
                "rooms": 1
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn check_availability_requires_every_field() {
        let (status, _) = post_json("/check-availability", json!({ "roomType": "Deluxe" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn book_room_rejects_invalid_email() {
        let (status, body) = post_json(
            "/book-room",
            json!({
                "email": "guest-at-example",
                "roomType": "Deluxe",
                "roomsBooked": 1,
                "numOfPersons": 2,
                "startDate": "2024-06-01",
                "endDate": "2024-06-05"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "email is not a valid address");
    }

    #[actix_web::test]
    async fn book_room_rejects_zero_rooms() {
        let (status, body) = post_json(
            "/book-room",
            json!({
                "email": "guest@example.com",
                "roomType": "Deluxe",
                "roomsBooked": 0,
                "numOfPersons": 2,
                "startDate": "2024-06-01",
                "endDate": "2024-06-05"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "roomsBooked must be greater than 0");
    }

    #[actix_web::test]
    async fn add_room_rejects_negative_capacity() {
        let (status, body) = post_json("/rooms", json!({ "type": "Deluxe", "totalRooms": -1 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "totalRooms must not be negative");
    }

    #[actix_web::test]
    async fn add_review_rejects_out_of_range_rating() {
        let (status, body) = post_json(
            "/reviews",
            json!({
                "email": "guest@example.com",
                "name": "Guest",
                "rating": 0,
                "comment": "Great view"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "rating must be between 1 and 5");
    }

    #[actix_web::test]
    async fn subscribe_rejects_invalid_email() {
        let (status, _) = post_json("/newsletters", json!({ "email": "nobody" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn empty_patch_is_rejected() {
        let app = test_app!();
        let req = test::TestRequest::patch()
            .uri("/bookings/67e55044-10b1-426f-9247-bb680e5fe0c8")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "no fields to update");
    }

    #[actix_web::test]
    async fn malformed_ids_are_not_found() {
        let app = test_app!();
        let req = test::TestRequest::delete().uri("/users/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn non_json_bodies_are_unsupported() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/rooms")
            .insert_header(("content-type", "text/plain"))
            .set_payload("type=Deluxe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
