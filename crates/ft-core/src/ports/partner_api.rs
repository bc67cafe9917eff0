//! Partner service port - registration and OTP dispatch

use async_trait::async_trait;

use crate::api::ApiError;
use crate::partner::{CreatedPartner, PartnerDraft, PartnerId, PartnerKind, Phone};

#[async_trait]
pub trait PartnerApiPort: Send + Sync {
    /// Register a new partner. Not idempotent: a duplicate call creates
    /// a duplicate partner, which is why this is never retried.
    async fn create(
        &self,
        kind: PartnerKind,
        draft: &PartnerDraft,
    ) -> Result<CreatedPartner, ApiError>;

    /// Replace the phone number stored for an existing partner.
    async fn update_phone(
        &self,
        kind: PartnerKind,
        id: &PartnerId,
        phone: &Phone,
    ) -> Result<(), ApiError>;

    /// Ask the backend to send a one-time password to the partner's
    /// stored phone.
    async fn send_otp(&self, kind: PartnerKind, id: &PartnerId) -> Result<(), ApiError>;
}
