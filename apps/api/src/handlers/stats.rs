use axum::extract::State;
use chrono::Utc;

use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::stats::{
    agent_stats, beneficiary_stats, insured_person_stats, payment_stats, policy_stats,
    user_stats, AgentStats, BeneficiaryStats, InsuredPersonStats, PaymentStats, PolicyStats,
    UserStats,
};

/// GET /api/policies/stats
pub async fn handle_policy_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<PolicyStats>, AppError> {
    state.simulate_latency().await;
    let policies = state.store.policies.all().await;
    Ok(ApiResponse::ok(policy_stats(&policies)))
}

/// GET /api/insured-persons/stats
pub async fn handle_insured_person_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<InsuredPersonStats>, AppError> {
    state.simulate_latency().await;
    let persons = state.store.insured_persons.all().await;
    Ok(ApiResponse::ok(insured_person_stats(
        &persons,
        Utc::now().date_naive(),
    )))
}

/// GET /api/premium-payments/stats
pub async fn handle_payment_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<PaymentStats>, AppError> {
    state.simulate_latency().await;
    let payments = state.store.premium_payments.all().await;
    Ok(ApiResponse::ok(payment_stats(&payments)))
}

/// GET /api/agents/stats
pub async fn handle_agent_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<AgentStats>, AppError> {
    state.simulate_latency().await;
    let agents = state.store.agents.all().await;
    let policies = state.store.policies.all().await;
    Ok(ApiResponse::ok(agent_stats(&agents, &policies)))
}

/// GET /api/beneficiaries/stats
pub async fn handle_beneficiary_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<BeneficiaryStats>, AppError> {
    state.simulate_latency().await;
    let policies = state.store.policies.all().await;
    let beneficiaries = state.store.beneficiaries.all().await;
    Ok(ApiResponse::ok(beneficiary_stats(&policies, &beneficiaries)))
}

/// GET /api/users/stats
pub async fn handle_user_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<UserStats>, AppError> {
    state.simulate_latency().await;
    let users = state.store.users.all().await;
    Ok(ApiResponse::ok(user_stats(&users)))
}
