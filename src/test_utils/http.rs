use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use serde_json::json;

use crate::{AppState, auth::COOKIE_OWNER_ID, build_router, endpoints, error::ErrorBody};

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).expect("Could not create test server.")
}

/// Open a session for `owner_id` and return the owner cookie to add to later requests.
pub(crate) async fn sign_in(server: &TestServer, owner_id: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::SESSION)
        .json(&json!({ "owner_id": owner_id }))
        .await;

    response.assert_status_success();

    response.cookie(COOKIE_OWNER_ID)
}

#[track_caller]
pub(crate) fn assert_error_message(response: &TestResponse, message: &str) {
    let body: ErrorBody = response.json();

    assert_eq!(body.message, message);
}
