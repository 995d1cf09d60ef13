// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! OpenID: user login
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};

use crate::account::ServiceState;
use crate::api::common;
use crate::api::error::AccountApiError;
use crate::api::openid::types::LoginRequest;
use crate::directory::DirectoryApi;
use crate::directory::types::Profile;

/// Authenticate the browser session against the directory.
///
/// When the session carries a suspended authentication request, the
/// request is re-dispatched right away and the user lands on the realm
/// approval form without an extra round trip.
#[utoipa::path(
    post,
    path = "/login",
    operation_id = "/openid:login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Authenticated profile, or the confirmation page of a resumed flow", body = Profile),
        (status = UNAUTHORIZED, description = "Invalid username or password"),
    ),
    tag = "openid"
)]
#[tracing::instrument(name = "api::openid_login", level = "debug", skip(state, headers, req), err(Debug))]
pub(super) async fn login(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Form(req): Form<LoginRequest>,
) -> Result<Response, AccountApiError> {
    let (session_id, new_cookie) = common::ensure_session(&headers)?;
    let profile = state
        .provider
        .get_directory_provider()
        .authenticate(&req.username, &req.password)
        .await?;
    state
        .conversations
        .set_profile(session_id, profile.clone())
        .await;

    // Resume the suspended protocol request when there is one.
    let conversation = state.conversations.get(session_id).await;
    let mut response = match &conversation {
        Some(conversation) if conversation.mode.is_some() => {
            let result = crate::openid::handle(&state, conversation).await?;
            super::render(result, conversation)
        }
        _ => Json(profile).into_response(),
    };
    if let Some(cookie) = new_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt; // for `collect`

    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;
    use crate::association::MockAssociationProvider;
    use crate::directory::MockDirectoryProvider;
    use crate::directory::error::DirectoryProviderError;
    use crate::directory::types::Profile;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_login_without_pending_flow_returns_profile() {
        let mut directory_mock = MockDirectoryProvider::default();
        directory_mock
            .expect_authenticate()
            .withf(|user_id, _| user_id == "alice")
            .return_once(|_, _| {
                Ok(Profile {
                    user_id: "alice".into(),
                    email: Some("a@x.com".into()),
                })
            });
        let state = get_mocked_state(MockAssociationProvider::default(), directory_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("username=alice&password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let profile: Profile = serde_json::from_slice(&body).unwrap();
        assert_eq!(profile.user_id, "alice");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_failure_is_unauthorized() {
        let mut directory_mock = MockDirectoryProvider::default();
        directory_mock
            .expect_authenticate()
            .return_once(|_, _| Err(DirectoryProviderError::AuthenticationFailed));
        let state = get_mocked_state(MockAssociationProvider::default(), directory_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("username=alice&password=wrong"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_resumes_pending_flow_on_confirmation_page() {
        let mut directory_mock = MockDirectoryProvider::default();
        directory_mock.expect_authenticate().return_once(|_, _| {
            Ok(Profile {
                user_id: "alice".into(),
                email: None,
            })
        });
        let state = get_mocked_state(MockAssociationProvider::default(), directory_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/?openid.mode=checkid_setup&openid.return_to=https%3A%2F%2Fci.example.org%2Fback")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("cookie", &cookie)
                    .body(Body::from("username=alice&password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();

        // The realm is still unapproved, so the resumed flow lands on the
        // approval form rather than the profile.
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("/openid/confirm"));
    }
}
