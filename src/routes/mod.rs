pub mod auth;
pub mod movies;
pub mod reviews;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/movies", get(movies::list))
        .route("/api/movies/genres/list", get(movies::genres))
        .route("/api/movies/years/list", get(movies::years))
        .route("/api/movies/{id}", get(movies::get))
        .route("/api/reviews", post(reviews::submit))
        .route("/api/reviews/movie/{movie_id}", get(reviews::for_movie))
        .route("/api/reviews/user/{user_id}", get(reviews::for_user))
        .route("/api/reviews/user/{user_id}/movie/{movie_id}", get(reviews::user_review))
        .route("/api/reviews/{movie_id}", delete(reviews::delete))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "message": "ok" }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseConnection, EntityTrait, Set};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        db::connect_test,
        entities::{movie, review},
        store::{CatalogStore, ReviewStore, UserStore},
    };

    const SECRET: &str = "test-secret";

    async fn test_app() -> (Router, DatabaseConnection, Arc<AppState>) {
        let db = connect_test().await;
        let config = Arc::new(Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            auth_secret: SECRET.to_string(),
            token_ttl_days: 1,
        });
        let state = Arc::new(AppState {
            config,
            catalog: CatalogStore::new(db.clone()),
            reviews: ReviewStore::new(db.clone()),
            users: UserStore::new(db.clone()),
        });
        (router(state.clone()), db, state)
    }

    async fn seed_movie(db: &DatabaseConnection, title: &str) -> i32 {
        movie::Entity::insert(movie::ActiveModel {
            title: Set(title.to_string()),
            genre: Set(Some("Crime".to_string())),
            year: Set(Some(1995)),
            created_at: Set(0),
            ..Default::default()
        })
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
    }

    async fn seed_user(state: &AppState, username: &str) -> (i32, String) {
        let hash = crate::auth::hash_password("hunter22").unwrap();
        let user =
            state.users.create(username, &format!("{username}@example.com"), &hash).await.unwrap();
        let token = crate::auth::create_token(SECRET.as_bytes(), user.id, 1).unwrap();
        (user.id, token)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_up() {
        let (app, _db, _state) = test_app().await;
        let resp = app.oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submitting_a_review_requires_a_token() {
        let (app, db, _state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;

        let req = json_req("POST", "/api/reviews", None, json!({ "movieId": movie_id, "rating": 4 }));
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = json_req(
            "POST",
            "/api/reviews",
            Some("bogus"),
            json!({ "movieId": movie_id, "rating": 4 }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_and_writes_nothing() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (_uid, token) = seed_user(&state, "vince").await;

        for rating in [0, 6] {
            let req = json_req(
                "POST",
                "/api/reviews",
                Some(&token),
                json!({ "movieId": movie_id, "rating": rating }),
            );
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        assert_eq!(review::Entity::find().all(&db).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn fractional_rating_is_a_validation_error_not_a_422() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (_uid, token) = seed_user(&state, "vince").await;

        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 3.5 }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(review::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overlong_review_text_is_rejected() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (_uid, token) = seed_user(&state, "vince").await;

        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 3, "reviewText": "x".repeat(1001) }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reviewing_an_unknown_movie_is_not_found() {
        let (app, _db, state) = test_app().await;
        let (_uid, token) = seed_user(&state, "vince").await;

        let req =
            json_req("POST", "/api/reviews", Some(&token), json!({ "movieId": 7, "rating": 4 }));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn review_lifecycle_updates_the_aggregate() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (uid, token) = seed_user(&state, "vince").await;

        // First submission creates.
        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 4, "reviewText": "Great" }),
        );
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.clone().oneshot(get_req(&format!("/api/movies/{movie_id}"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let detail = body_json(resp).await;
        assert_eq!(detail["review_count"], 1);
        assert_eq!(detail["average_rating"], 4.0);

        // Resubmission replaces in place.
        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 2 }),
        );
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.clone().oneshot(get_req(&format!("/api/movies/{movie_id}"))).await.unwrap();
        let detail = body_json(resp).await;
        assert_eq!(detail["review_count"], 1);
        assert_eq!(detail["average_rating"], 2.0);

        // Point lookup sees the replacement.
        let resp = app
            .clone()
            .oneshot(get_req(&format!("/api/reviews/user/{uid}/movie/{movie_id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["review"]["rating"], 2);
        assert_eq!(body["review"]["username"], "vince");

        // Delete, then deleting again is a 404.
        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/reviews/{movie_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/reviews/{movie_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn movie_listing_tolerates_unknown_sort_params() {
        let (app, db, _state) = test_app().await;
        seed_movie(&db, "Heat").await;
        seed_movie(&db, "Ronin").await;

        let resp =
            app.oneshot(get_req("/api/movies?sortBy=unknownfield&order=sideways")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["movies"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_movie_detail_is_not_found() {
        let (app, _db, _state) = test_app().await;
        let resp = app.oneshot(get_req("/api/movies/999")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn paginated_review_listing_shape() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (uid, token) = seed_user(&state, "vince").await;

        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 5 }),
        );
        app.clone().oneshot(req).await.unwrap();

        let resp = app
            .clone()
            .oneshot(get_req(&format!("/api/reviews/movie/{movie_id}?page=1&limit=10")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["pages"], 1);

        let resp = app.oneshot(get_req(&format!("/api/reviews/user/{uid}"))).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["reviews"][0]["title"], "Heat");
    }

    #[tokio::test]
    async fn absurd_page_query_value_is_served_not_crashed() {
        let (app, db, state) = test_app().await;
        let movie_id = seed_movie(&db, "Heat").await;
        let (_uid, token) = seed_user(&state, "vince").await;

        let req = json_req(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "movieId": movie_id, "rating": 5 }),
        );
        app.clone().oneshot(req).await.unwrap();

        let uri = format!("/api/reviews/movie/{movie_id}?page={}&limit=100", u64::MAX);
        let resp = app.oneshot(get_req(&uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["reviews"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn register_and_login() {
        let (app, _db, _state) = test_app().await;

        let req = json_req(
            "POST",
            "/api/auth/register",
            None,
            json!({ "username": "vince", "email": "vince@example.com", "password": "hunter22" }),
        );
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["username"], "vince");

        let req = json_req(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "vince", "password": "wrong-password" }),
        );
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = json_req(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "vince", "password": "hunter22" }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
