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

//! OpenID: realm approval
use axum::{extract::State, http::HeaderMap, response::Response};

use crate::account::ServiceState;
use crate::api::common;
use crate::api::error::AccountApiError;
use crate::openid::identity;

/// Approve the relying party realm of the suspended request.
///
/// Records the approval for the rest of the session, pins the session's
/// identity URL and re-dispatches the stored request, which now yields
/// the signed assertion redirect.
#[utoipa::path(
    post,
    path = "/confirm",
    operation_id = "/openid:confirm",
    responses(
        (status = SEE_OTHER, description = "Signed assertion delivered by redirecting to the relying party"),
        (status = BAD_REQUEST, description = "No suspended authentication request in this session"),
        (status = UNAUTHORIZED, description = "The session is not authenticated"),
    ),
    tag = "openid"
)]
#[tracing::instrument(name = "api::openid_confirm", level = "debug", skip(state, headers), err(Debug))]
pub(super) async fn confirm(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, AccountApiError> {
    let session_id =
        common::session_id(&headers).ok_or(AccountApiError::Unauthorized(None))?;
    let mut conversation = state
        .conversations
        .get(session_id)
        .await
        .ok_or_else(|| AccountApiError::BadRequest("no active conversation".into()))?;
    let profile = conversation
        .profile
        .clone()
        .ok_or(AccountApiError::Unauthorized(None))?;
    let realm = conversation
        .realm
        .clone()
        .ok_or_else(|| AccountApiError::BadRequest("no realm to approve".into()))?;

    conversation.approve(realm);
    conversation.identity = Some(identity::resolve(
        &state.config.public_endpoint(),
        &profile.user_id,
    ));
    state
        .conversations
        .save(session_id, conversation.clone())
        .await;

    let result = crate::openid::handle(&state, &conversation).await?;
    Ok(super::render(result, &conversation))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;
    use crate::account::Service;
    use crate::association::MockAssociationProvider;
    use crate::config::{Config, DefaultSection};
    use crate::directory::MockDirectoryProvider;
    use crate::directory::types::Profile;
    use crate::openid::types::Message;
    use crate::provider::Provider;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_confirm_without_session_is_unauthorized() {
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
                    .method("POST")
                    .uri("/confirm")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_full_flow_approval_yields_assertion_redirect() {
        let mut association_mock = MockAssociationProvider::default();
        association_mock
            .expect_auth_response()
            .withf(|_, claimed_id, local_id| {
                // The identity is the public endpoint with "~user" appended
                // directly, no path separator in between.
                claimed_id == "https://id.example.org~alice" && claimed_id == local_id
            })
            .return_once(|_, claimed_id, _| {
                let mut message = Message::new();
                message.set("mode", "id_res");
                message.set("claimed_id", claimed_id);
                message.set("return_to", "https://ci.example.org/back");
                message.set("sig", "c2ln");
                Ok(message)
            });
        let mut directory_mock = MockDirectoryProvider::default();
        directory_mock.expect_authenticate().return_once(|_, _| {
            Ok(Profile {
                user_id: "alice".into(),
                email: Some("a@x.com".into()),
            })
        });
        let config = Config {
            default: Some(DefaultSection {
                debug: None,
                public_endpoint: Some("https://id.example.org".into()),
            }),
            ..Default::default()
        };
        let provider = Provider::mocked_builder()
            .association(association_mock)
            .directory(directory_mock)
            .build()
            .unwrap();
        let state = Arc::new(Service::new(config, provider).unwrap());

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        // Relying party sends the user here with an authentication request.
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

        // The user signs in.
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
        assert_eq!(response.status(), StatusCode::OK);

        // The user approves the realm; the stored request replays and the
        // browser is sent back to the relying party.
        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/confirm")
                    .header("cookie", &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(location.starts_with("https://ci.example.org/back"));
        assert!(location.contains("openid.mode=id_res"));
        assert!(location.contains("id.example.org~alice"));
        assert!(location.contains("openid.sig=c2ln"));
    }
}
