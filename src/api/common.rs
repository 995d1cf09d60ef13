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
//! Session cookie plumbing shared by the API handlers.
//!
//! The cookie only carries an opaque session id; every piece of state lives
//! server-side in the conversation store.
use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use crate::api::error::AccountApiError;

pub(crate) const SESSION_COOKIE: &str = "account_openid_session";

/// Extract the session id from the request cookies.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let (name, value) = cookie.trim().split_once('=')?;
                if name == SESSION_COOKIE {
                    Uuid::parse_str(value.trim()).ok()
                } else {
                    None
                }
            })
        })
}

/// The request's session id, minting a fresh one when the browser carries
/// no valid cookie. The second element is the `Set-Cookie` value to attach
/// to the response for a fresh session.
pub(crate) fn ensure_session(
    headers: &HeaderMap,
) -> Result<(Uuid, Option<HeaderValue>), AccountApiError> {
    match session_id(headers) {
        Some(session_id) => Ok((session_id, None)),
        None => {
            let session_id = Uuid::new_v4();
            Ok((session_id, Some(session_cookie(session_id)?)))
        }
    }
}

/// `Set-Cookie` value binding the session id to the browser.
pub(crate) fn session_cookie(session_id: Uuid) -> Result<HeaderValue, AccountApiError> {
    HeaderValue::try_from(format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .map_err(|_| AccountApiError::InvalidHeader)
}

/// `Set-Cookie` value removing the session cookie.
pub(crate) fn clear_session_cookie() -> Result<HeaderValue, AccountApiError> {
    HeaderValue::try_from(format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
    .map_err(|_| AccountApiError::InvalidHeader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_parses_cookie() {
        let session = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::try_from(format!("other=1; {SESSION_COOKIE}={session}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(session));
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("account_openid_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn test_ensure_session_mints_cookie_once() {
        let headers = HeaderMap::new();
        let (session, cookie) = ensure_session(&headers).unwrap();
        assert!(cookie.is_some());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::try_from(format!("{SESSION_COOKIE}={session}")).unwrap(),
        );
        let (again, cookie) = ensure_session(&headers).unwrap();
        assert_eq!(again, session);
        assert!(cookie.is_none());
    }
}
