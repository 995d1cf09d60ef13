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

//! OpenID: logout
use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::account::ServiceState;
use crate::api::common;
use crate::api::error::AccountApiError;

/// End the browser session.
///
/// Drops the conversation with its realm approvals and clears the session
/// cookie. Idempotent; an anonymous session logs out to the same place.
#[utoipa::path(
    get,
    path = "/logout",
    operation_id = "/openid:logout",
    responses(
        (status = SEE_OTHER, description = "Session ended"),
    ),
    tag = "openid"
)]
#[tracing::instrument(name = "api::openid_logout", level = "debug", skip(state, headers), err(Debug))]
pub(super) async fn logout(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, AccountApiError> {
    if let Some(session_id) = common::session_id(&headers) {
        state.conversations.remove(session_id).await;
    }
    let mut response = Redirect::to("/").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, common::clear_session_cookie()?);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;
    use crate::association::MockAssociationProvider;
    use crate::directory::MockDirectoryProvider;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_logout_clears_cookie() {
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
                    .uri("/logout")
                    .header("cookie", "account_openid_session=not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
