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
//! OpenID provider endpoints
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::account::ServiceState;
use crate::openid::conversation::Conversation;
use crate::openid::dispatcher::ProtocolResult;

pub mod confirm;
pub mod entry;
pub mod login;
pub mod logout;
pub mod types;

pub(crate) const DESCRIPTION: &str = "OpenID 2.0 provider endpoint. \
Relying parties establish associations and request identity assertions \
here; users confirm relying party realms through the same surface.";

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(entry::entry_get, entry::entry_post))
        .routes(routes!(login::login))
        .routes(routes!(confirm::confirm))
        .routes(routes!(logout::logout))
}

/// Render a dispatch outcome onto HTTP: direct responses as `text/plain`
/// key-value form, indirect responses as a redirect to the relying party
/// and the confirmation detour as an HTML page.
pub(super) fn render(result: ProtocolResult, conversation: &Conversation) -> Response {
    match result {
        ProtocolResult::Response(message) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message.to_key_value_form(),
        )
            .into_response(),
        ProtocolResult::Redirect(url) => Redirect::to(url.as_str()).into_response(),
        ProtocolResult::ConfirmationRequired => confirmation_page(conversation).into_response(),
    }
}

/// The page shown while an authentication request is suspended: a login
/// form when the session is anonymous, the realm approval form otherwise.
fn confirmation_page(conversation: &Conversation) -> Html<String> {
    let realm = escape(conversation.realm.as_deref().unwrap_or("this site"));
    let form = if conversation.profile.is_some() {
        format!(
            "<p>{realm} is requesting your identity.</p>\n\
             <form method=\"post\" action=\"/openid/confirm\">\n\
             <button type=\"submit\">Approve</button>\n\
             </form>"
        )
    } else {
        format!(
            "<p>{realm} is requesting your identity. Please sign in.</p>\n\
             <form method=\"post\" action=\"/openid/login\">\n\
             <input name=\"username\" autocomplete=\"username\">\n\
             <input name=\"password\" type=\"password\" autocomplete=\"current-password\">\n\
             <button type=\"submit\">Sign in</button>\n\
             </form>"
        )
    };
    Html(format!(
        "<!DOCTYPE html>\n<html><head><title>Sign in</title></head>\n<body>\n{form}\n</body></html>"
    ))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"a&b\"</b>"),
            "&lt;b&gt;&quot;a&amp;b&quot;&lt;/b&gt;"
        );
    }
}
