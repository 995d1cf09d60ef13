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
//! Account service API
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::account::ServiceState;

pub(crate) mod common;
pub mod error;
pub mod openid;

#[derive(OpenApi)]
#[openapi(
    info(version = "1.0.0"),
    tags(
        (name="openid", description=openid::DESCRIPTION),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().nest("/openid", openid::openapi_router())
}
