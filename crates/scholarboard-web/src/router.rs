use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use crate::handlers::{edit, keywords, tables};
use crate::state::AppState;

pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/keywords", get(keywords::list))
        .route("/api/keywords/popularity", get(keywords::popularity))
        .route("/api/keywords/trend", post(keywords::trend))
        .route("/api/publications", get(tables::publications))
        .route("/api/publications/keywords", get(keywords::publication_keywords))
        .route("/api/universities", post(tables::universities))
        .route("/api/professors", get(tables::professors))
        .route("/api/faculty/publications", post(tables::faculty_publications))
        .route("/api/publications/edit/open", post(edit::open_publication))
        .route("/api/publications/edit/save", post(edit::save_publication))
        .route("/api/publications/edit/cancel", post(edit::cancel_publication))
        .route("/api/professors/edit/open", post(edit::open_professor))
        .route("/api/professors/edit/save", post(edit::save_professor))
        .route("/api/professors/edit/cancel", post(edit::cancel_professor))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use scholarboard_core::{Dashboard, FixtureDataset};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SAMPLE: &str = include_str!("../../scholarboard-core/fixtures/sample.json");

    fn app_with_state() -> (Router, Arc<AppState>) {
        let dataset = FixtureDataset::from_json(SAMPLE).unwrap();
        let state = Arc::new(AppState::new(Dashboard::from_fixture(dataset).unwrap()));
        (build(Arc::clone(&state)), state)
    }

    fn app() -> Router {
        app_with_state().0
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, session: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .header("x-session-id", session)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn keywords_are_listed() {
        let (status, body) = send(&app(), get_req("/api/keywords")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn popularity_defaults_and_clamps() {
        let app = app();
        let (_, body) = send(&app, get_req("/api/keywords/popularity")).await;
        assert_eq!(body["title"], "Top 10 Keywords (Since 2012)");
        assert_eq!(body["rows"][0], json!({ "keyword": "nlp", "popularity": 6 }));

        let (_, body) = send(&app, get_req("/api/keywords/popularity?n=2")).await;
        assert_eq!(body["title"], "Top 5 Keywords (Since 2012)");
    }

    #[tokio::test]
    async fn trend_rows_use_field_names() {
        let (status, body) = send(
            &app(),
            post_req("/api/keywords/trend", "s1", json!({ "keywords": ["vision"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["rows"],
            json!([{ "year": 2020, "keyword": "vision", "publication_count": 1 }])
        );
    }

    #[tokio::test]
    async fn publication_rows_use_num_citations() {
        let (_, body) = send(&app(), get_req("/api/publications?keyword=vision")).await;
        assert_eq!(body[0]["numCitations"], 30);
        assert_eq!(body[0]["title"], "Visual Question Answering at Scale");
    }

    #[tokio::test]
    async fn unclicked_search_is_no_content() {
        let app = app();
        let (status, _) = send(
            &app,
            post_req("/api/universities", "s1", json!({ "keyword": "nlp", "n_clicks": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            post_req("/api/universities", "s1", json!({ "keyword": "nlp", "n_clicks": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Faculty Count for 'nlp'");
        assert_eq!(body["rows"][0]["facultyCount"], 2);
    }

    #[tokio::test]
    async fn professor_cards_and_faculty_publications() {
        let app = app();
        let (_, body) = send(&app, get_req("/api/professors?keyword=machine%20learning")).await;
        assert_eq!(body["cards"][0]["totalCitations"], 200);
        assert_eq!(body["message"], Value::Null);

        let (_, body) = send(
            &app,
            post_req(
                "/api/faculty/publications",
                "s1",
                json!({ "names": "Tim Davis, Peggy Agouris", "n_clicks": 1 }),
            ),
        )
        .await;
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
        assert_eq!(body["rows"][0]["faculty"], "Agouris,Peggy");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let (status, body) = send(
            &app(),
            post_req(
                "/api/publications/edit/open",
                "s1",
                json!({ "target": { "by": "title", "value": " " }, "n_clicks": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn edit_state_is_per_session() {
        let app = app();
        let open = json!({
            "target": { "by": "title", "value": "Tokenization Revisited" },
            "n_clicks": 1
        });
        let (_, body) = send(&app, post_req("/api/publications/edit/open", "alice", open)).await;
        assert_eq!(body["open"], true);
        assert_eq!(body["form"]["numCitations"], 5);

        let save = json!({ "n_clicks": 1, "new_citations": 8, "current_keyword": "nlp" });
        let (_, body) = send(
            &app,
            post_req("/api/publications/edit/save", "bob", save.clone()),
        )
        .await;
        assert_eq!(body["saved"], false);

        let (_, body) = send(&app, post_req("/api/publications/edit/save", "alice", save)).await;
        assert_eq!(body["saved"], true);
        assert_eq!(body["refresh_keyword"], "nlp");
    }

    #[tokio::test]
    async fn professor_edit_round_trip() {
        let app = app();
        let (_, body) = send(
            &app,
            post_req(
                "/api/professors/edit/open",
                "s1",
                json!({ "faculty_id": 103, "n_clicks": 1 }),
            ),
        )
        .await;
        assert_eq!(body["form"]["name"], "Turing,Alan");
        assert_eq!(body["form"]["research_interest"], "Computability");

        let (_, body) = send(
            &app,
            post_req("/api/professors/edit/cancel", "s1", json!({ "n_clicks": 1 })),
        )
        .await;
        assert_eq!(body["closed"], true);

        let (_, body) = send(
            &app,
            post_req(
                "/api/professors/edit/open",
                "s1",
                json!({ "faculty_id": 103, "n_clicks": null }),
            ),
        )
        .await;
        assert_eq!(body, json!({ "open": false, "form": null }));
    }

    #[tokio::test]
    async fn sessions_are_dropped_once_dialogs_close() {
        let (app, state) = app_with_state();
        let open = json!({
            "target": { "by": "title", "value": "Tokenization Revisited" },
            "n_clicks": 1
        });
        let (_, body) = send(&app, post_req("/api/publications/edit/open", "alice", open)).await;
        assert_eq!(body["open"], true);
        assert_eq!(state.session_count(), 1);

        let save = json!({ "n_clicks": 1, "new_citations": 9, "current_keyword": "nlp" });
        let (_, body) = send(&app, post_req("/api/publications/edit/save", "alice", save)).await;
        assert_eq!(body["saved"], true);
        assert_eq!(state.session_count(), 0);

        let open = json!({ "faculty_id": 103, "n_clicks": 1 });
        send(&app, post_req("/api/professors/edit/open", "bob", open)).await;
        assert_eq!(state.session_count(), 1);
        let (_, body) = send(
            &app,
            post_req("/api/professors/edit/cancel", "bob", json!({ "n_clicks": 1 })),
        )
        .await;
        assert_eq!(body["closed"], true);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn stray_requests_do_not_create_sessions() {
        let (app, state) = app_with_state();
        for i in 0..50 {
            let session = format!("visitor-{i}");
            let miss = json!({ "faculty_id": 404, "n_clicks": 1 });
            let (_, body) =
                send(&app, post_req("/api/professors/edit/open", &session, miss)).await;
            assert_eq!(body["open"], false);

            let save = json!({ "n_clicks": 1, "photo_url": "https://img.example.org/x.jpg" });
            let (_, body) =
                send(&app, post_req("/api/professors/edit/save", &session, save)).await;
            assert_eq!(body["saved"], false);

            send(
                &app,
                post_req("/api/publications/edit/cancel", &session, json!({ "n_clicks": 1 })),
            )
            .await;
        }
        assert_eq!(state.session_count(), 0);
    }
}
