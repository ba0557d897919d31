use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use chandler_core::supplier::{
    KycDocument, OnboardingStatus, SupplierProfile, SupplierTier, TierCapabilities,
};
use chandler_core::{ActorRole, DomainError};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/suppliers/{org_id}/profile",
            put(upsert_profile).get(get_profile),
        )
        .route("/v1/suppliers/{org_id}/capabilities", get(get_capabilities))
}

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub legal_name: String,
    pub tier: SupplierTier,
    pub onboarding_status: OnboardingStatus,
    #[serde(default)]
    pub kyc_documents: Vec<KycDocument>,
}

async fn fetch_profile(state: &AppState, org_id: Uuid) -> Result<SupplierProfile, ApiError> {
    Ok(state
        .suppliers
        .get_profile(org_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("supplier profile for {org_id}")))?)
}

/// PUT /v1/suppliers/{org_id}/profile
///
/// Ingestion endpoint for the external onboarding workflow. Tier and
/// onboarding status are facts decided elsewhere; this only records them.
async fn upsert_profile(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(org_id): Path<Uuid>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<SupplierProfile>, ApiError> {
    if actor.role != ActorRole::System {
        return Err(
            DomainError::authorization("profile ingestion is restricted to system callers").into(),
        );
    }
    if req.legal_name.trim().is_empty() {
        return Err(DomainError::validation("legal_name", "legal name is required").into());
    }
    let now = Utc::now();
    let created_at = state
        .suppliers
        .get_profile(org_id)
        .await?
        .map_or(now, |existing| existing.created_at);
    let profile = SupplierProfile {
        organization_id: org_id,
        legal_name: req.legal_name,
        tier: req.tier,
        onboarding_status: req.onboarding_status,
        kyc_documents: req.kyc_documents,
        created_at,
        updated_at: now,
    };
    state.suppliers.save_profile(profile.clone()).await?;
    tracing::info!(organization_id = %org_id, tier = ?profile.tier, "supplier profile saved");
    Ok(Json(profile))
}

/// GET /v1/suppliers/{org_id}/profile
async fn get_profile(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(org_id): Path<Uuid>,
) -> Result<Json<SupplierProfile>, ApiError> {
    if actor.role == ActorRole::Supplier {
        actor.ensure_owns(org_id)?;
    }
    Ok(Json(fetch_profile(&state, org_id).await?))
}

/// GET /v1/suppliers/{org_id}/capabilities
async fn get_capabilities(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<TierCapabilities>, ApiError> {
    let profile = fetch_profile(&state, org_id).await?;
    Ok(Json(profile.capabilities()))
}
