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
//! # Identity resolver

/// The stable identity URL of a user.
///
/// Deterministic for a given application base URL and user identifier. The
/// result serves as both the claimed identifier and the local identifier;
/// identifier delegation is not supported.
pub fn resolve(base_url: &str, user_id: &str) -> String {
    format!("{base_url}~{user_id}")
}
