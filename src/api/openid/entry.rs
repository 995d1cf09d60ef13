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

//! OpenID: protocol entry point
use std::collections::BTreeMap;

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::Response,
};

use crate::account::ServiceState;
use crate::api::common;
use crate::api::error::AccountApiError;
use crate::openid::types::ParameterList;

/// OpenID protocol entry point (GET).
///
/// Accepts every `openid.mode` the provider implements. Direct modes are
/// answered in key-value form; authentication requests either redirect
/// back to the relying party with a signed assertion or suspend on the
/// confirmation page.
#[utoipa::path(
    get,
    path = "/",
    operation_id = "/openid:entry",
    responses(
        (status = OK, description = "Direct protocol response in key-value form, or the confirmation page"),
        (status = SEE_OTHER, description = "Signed assertion delivered by redirecting to the relying party"),
    ),
    tag = "openid"
)]
#[tracing::instrument(name = "api::openid_entry", level = "debug", skip(state, headers), err(Debug))]
pub(super) async fn entry_get(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AccountApiError> {
    process(&state, &headers, params.into()).await
}

/// OpenID protocol entry point (POST).
///
/// Identical to the GET entry point; relying parties deliver large
/// requests (direct association among them) as form bodies.
#[utoipa::path(
    post,
    path = "/",
    operation_id = "/openid:entry_post",
    responses(
        (status = OK, description = "Direct protocol response in key-value form, or the confirmation page"),
        (status = SEE_OTHER, description = "Signed assertion delivered by redirecting to the relying party"),
    ),
    tag = "openid"
)]
#[tracing::instrument(name = "api::openid_entry", level = "debug", skip(state, headers), err(Debug))]
pub(super) async fn entry_post(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Form(params): Form<BTreeMap<String, String>>,
) -> Result<Response, AccountApiError> {
    process(&state, &headers, params.into()).await
}

/// Absorb the request into the session's conversation and dispatch it.
pub(super) async fn process(
    state: &ServiceState,
    headers: &HeaderMap,
    params: ParameterList,
) -> Result<Response, AccountApiError> {
    let (session_id, new_cookie) = common::ensure_session(headers)?;
    let conversation = state.conversations.absorb(session_id, params).await;
    let result = crate::openid::handle(state, &conversation).await?;
    let mut response = super::render(result, &conversation);
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
    use crate::openid::types::Message;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_associate_direct_response() {
        let mut association_mock = MockAssociationProvider::default();
        association_mock
            .expect_association_response()
            .return_once(|_| {
                let mut message = Message::new();
                message.set("assoc_handle", "h1");
                message.set("session_type", "no-encryption");
                Ok(message)
            });
        let state = get_mocked_state(association_mock, MockDirectoryProvider::default());

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/?openid.mode=associate&openid.session_type=no-encryption&openid.assoc_type=HMAC-SHA256")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("set-cookie")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("account_openid_session="))
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("assoc_handle:h1\n"));
        assert!(body.contains("session_type:no-encryption\n"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_checkid_setup_shows_confirmation_page() {
        let state = get_mocked_state(
            MockAssociationProvider::default(),
            MockDirectoryProvider::default(),
        );

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
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("ci.example.org"));
        assert!(body.contains("name=\"username\""));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_checkid_without_realm_is_bad_request() {
        let state = get_mocked_state(
            MockAssociationProvider::default(),
            MockDirectoryProvider::default(),
        );

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/?openid.mode=checkid_setup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unknown_mode_is_internal_error() {
        let state = get_mocked_state(
            MockAssociationProvider::default(),
            MockDirectoryProvider::default(),
        );

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/?openid.mode=id_res")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_check_authentication_as_form_post() {
        let mut association_mock = MockAssociationProvider::default();
        association_mock.expect_verify().return_once(|_| {
            let mut message = Message::new();
            message.set("is_valid", "true");
            Ok(message)
        });
        let state = get_mocked_state(association_mock, MockDirectoryProvider::default());

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "openid.mode=check_authentication&openid.assoc_handle=h1\
                         &openid.signed=identity&openid.sig=c2ln",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("is_valid:true\n"));
    }
}
