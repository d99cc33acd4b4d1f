use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::models::beneficiary::{allocation_for, AllocationSummary};
use crate::models::{Agent, Beneficiary, InsuredPerson, Policy, PremiumPayment};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A policy with every linked record resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    pub policy: Policy,
    /// `None` when the linked record has since been deleted.
    pub insured_person: Option<InsuredPerson>,
    pub agent: Option<Agent>,
    pub beneficiaries: Vec<Beneficiary>,
    pub payments: Vec<PremiumPayment>,
    pub beneficiary_allocation: AllocationSummary,
}

/// GET /api/policies/:id/details
pub async fn handle_policy_details(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<PolicyDetails>, AppError> {
    state.simulate_latency().await;
    let store = &state.store;
    let policy = store
        .policies
        .find(id)
        .await
        .ok_or_else(|| AppError::not_found("Policy", id))?;

    let insured_person = store.insured_persons.find(policy.insured_person_id).await;
    let agent = store.agents.find(policy.agent_id).await;
    let beneficiaries = store.beneficiaries.filter_by(|b| b.policy_id == id).await;
    let payments = store.premium_payments.filter_by(|p| p.policy_id == id).await;
    let beneficiary_allocation = allocation_for(id, &beneficiaries);

    Ok(ApiResponse::ok(PolicyDetails {
        policy,
        insured_person,
        agent,
        beneficiaries,
        payments,
        beneficiary_allocation,
    }))
}
