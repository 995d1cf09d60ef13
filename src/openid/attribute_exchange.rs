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
//! # Attribute exchange responder
//!
//! Answers an attribute exchange fetch request from the authenticated
//! user's profile. Everything disclosed here is mechanically derived from
//! the already-confirmed identity, so realm approval covers the attribute
//! values and no separate consent step exists.
use crate::directory::types::Profile;
use crate::openid::types::{FetchRequest, FetchResponse};

/// Attribute type URI for the user's email address (axschema).
pub const TYPE_EMAIL: &str = "http://axschema.org/contact/email";

/// Legacy attribute type URI for the email address.
pub const TYPE_EMAIL_OPENID: &str = "http://schema.openid.net/contact/email";

/// Attribute type URI for the user's short name.
pub const TYPE_FRIENDLY_NAME: &str = "http://axschema.org/namePerson/friendly";

/// Build the fetch response for a fetch request.
///
/// Only the recognized attribute type URIs produce entries; anything else
/// is dropped silently, without an error and without a partial failure.
pub fn respond(fetch: &FetchRequest, profile: &Profile) -> FetchResponse {
    let mut response = FetchResponse::default();
    for (alias, type_uri) in &fetch.attributes {
        match type_uri.as_str() {
            TYPE_EMAIL | TYPE_EMAIL_OPENID => {
                if let Some(email) = &profile.email {
                    response.add(alias.clone(), type_uri, email);
                }
            }
            TYPE_FRIENDLY_NAME => {
                response.add(alias.clone(), type_uri, &profile.user_id);
            }
            _ => {}
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            user_id: "alice".into(),
            email: Some("a@x.com".into()),
        }
    }

    fn fetch(pairs: &[(&str, &str)]) -> FetchRequest {
        FetchRequest {
            attributes: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_recognized_attributes() {
        let request = fetch(&[
            ("e", TYPE_EMAIL),
            ("n", TYPE_FRIENDLY_NAME),
            ("x", "http://axschema.org/person/gender"),
        ]);
        let response = respond(&request, &profile());
        assert_eq!(response.get("e"), Some("a@x.com"));
        assert_eq!(response.get("n"), Some("alice"));
        assert_eq!(response.get("x"), None);
    }

    #[test]
    fn test_legacy_email_uri() {
        let response = respond(&fetch(&[("mail", TYPE_EMAIL_OPENID)]), &profile());
        assert_eq!(response.get("mail"), Some("a@x.com"));
    }

    #[test]
    fn test_profile_without_email_yields_no_entry() {
        let profile = Profile {
            user_id: "alice".into(),
            email: None,
        };
        let response = respond(&fetch(&[("e", TYPE_EMAIL)]), &profile);
        assert_eq!(response.get("e"), None);
    }

    #[test]
    fn test_unrecognized_request_yields_empty_response() {
        let response = respond(&fetch(&[("x", "urn:example:unknown")]), &profile());
        assert!(response.is_empty());
    }
}
