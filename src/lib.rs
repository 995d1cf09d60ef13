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

//! # Account OpenID provider
//!
//! A compact OpenID 2.0 identity provider for a user account service. User
//! accounts live in an external LDAP directory; this service fronts them
//! with the provider side of the OpenID 2.0 protocol so that third-party
//! relying parties can authenticate users without ever seeing their
//! directory credentials.
//!
//! The service implements the provider half of the protocol only:
//!
//! - `associate` for establishing shared-secret associations (the
//!   `no-encryption` session over HTTPS; Diffie-Hellman exchanges are not
//!   offered),
//! - `checkid_setup` and `checkid_immediate` authentication requests with
//!   per-session realm approval gating,
//! - signed positive assertions with the attribute exchange extension
//!   answering email and short-name fetch requests,
//! - `check_authentication` for relying parties verifying assertions
//!   issued against private associations.
//!
//! Relying party discovery, identifier delegation and the storage side of
//! attribute exchange are deliberately out of scope.
//!
//! Architecturally the crate follows a provider/backend split: the
//! [`provider::Provider`] manager hands out the association service and the
//! user directory, each of which delegates to a pluggable backend driver
//! selected through configuration. The protocol core in [`openid`] is
//! transport-agnostic; the axum HTTP surface in [`api`] renders its
//! outcomes onto responses.

pub mod account;
pub mod api;
pub mod association;
pub mod config;
pub mod directory;
pub mod error;
pub mod openid;
pub mod plugin_manager;
pub mod provider;

#[cfg(test)]
mod tests;
