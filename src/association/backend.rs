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

use async_trait::async_trait;
use dyn_clone::DynClone;

use super::error::AssociationProviderError;
use crate::config::Config;
use crate::openid::types::{Message, ParameterList};

pub mod hmac;

pub use hmac::HmacBackend;

/// Association service driver interface.
///
/// A driver owns the association records and everything derived from them:
/// association establishment, assertion signing and assertion verification.
#[async_trait]
pub trait AssociationBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config
    fn set_config(&mut self, config: Config);

    /// Establish a new association for a relying party and render the
    /// direct response message.
    async fn associate(
        &self,
        params: &ParameterList,
    ) -> Result<Message, AssociationProviderError>;

    /// Build the signed positive assertion (`id_res`) for an authentication
    /// request.
    async fn auth_response(
        &self,
        params: &ParameterList,
        claimed_id: &str,
        local_id: &str,
    ) -> Result<Message, AssociationProviderError>;

    /// Answer a `check_authentication` request for a previously issued
    /// assertion.
    async fn verify(
        &self,
        params: &ParameterList,
    ) -> Result<Message, AssociationProviderError>;

    /// Drop expired associations; returns the number reclaimed.
    async fn cleanup(&self) -> Result<usize, AssociationProviderError>;
}

dyn_clone::clone_trait_object!(AssociationBackend);
