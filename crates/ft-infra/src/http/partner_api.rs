//! HTTP client for partner registration and OTP dispatch
//!
//! Every call here is a mutation, so nothing is retried. The create
//! deadline differs per partner kind (see [`ApiTimeouts`]).

use std::sync::Arc;

use async_trait::async_trait;
use ft_core::partner::{CreatedPartner, PartnerDraft, PartnerId, PartnerKind, Phone};
use ft_core::ports::partner_api::PartnerApiPort;
use ft_core::ApiError;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::gateway::{HttpGateway, RequestOptions};
use super::timeouts::ApiTimeouts;

#[derive(Debug, Deserialize)]
struct CreatePartnerResponse {
    id: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdatePhoneBody<'a> {
    phone: &'a str,
}

pub struct HttpPartnerApi {
    gateway: Arc<HttpGateway>,
    timeouts: ApiTimeouts,
}

impl HttpPartnerApi {
    pub fn new(gateway: Arc<HttpGateway>, timeouts: ApiTimeouts) -> Self {
        Self { gateway, timeouts }
    }

    fn create_options(&self, kind: PartnerKind) -> RequestOptions {
        match self.timeouts.create_timeout(kind) {
            Some(timeout) => RequestOptions::with_timeout(timeout),
            None => RequestOptions::unbounded(),
        }
    }
}

#[async_trait]
impl PartnerApiPort for HttpPartnerApi {
    async fn create(
        &self,
        kind: PartnerKind,
        draft: &PartnerDraft,
    ) -> Result<CreatedPartner, ApiError> {
        let path = format!("/{}/create/", kind.as_str());
        let response: CreatePartnerResponse = self
            .gateway
            .post_json(&path, draft, self.create_options(kind))
            .await?;

        // The backend may echo the stored phone in its own format; fall
        // back to what we submitted when it doesn't.
        let phone = response
            .phone
            .as_deref()
            .and_then(|raw| Phone::parse(raw).ok())
            .unwrap_or_else(|| draft.phone.clone());

        info!(kind = %kind, partner_id = %response.id, "partner created");
        Ok(CreatedPartner {
            id: PartnerId::new(response.id),
            phone,
        })
    }

    async fn update_phone(
        &self,
        kind: PartnerKind,
        id: &PartnerId,
        phone: &Phone,
    ) -> Result<(), ApiError> {
        let path = format!("/{}/{}/", kind.as_str(), id.as_str());
        let body = UpdatePhoneBody {
            phone: phone.as_str(),
        };
        let options = RequestOptions::with_timeout(self.timeouts.standard);
        self.gateway.patch_unit(&path, &body, options).await
    }

    async fn send_otp(&self, kind: PartnerKind, id: &PartnerId) -> Result<(), ApiError> {
        let path = format!("/{}/{}/send-otp/", kind.as_str(), id.as_str());
        let options = RequestOptions::with_timeout(self.timeouts.standard);
        self.gateway
            .post_unit(&path, &serde_json::json!({}), options)
            .await
    }
}
