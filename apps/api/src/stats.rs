//! Aggregations behind the dashboard charts. Pure functions over snapshots.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::beneficiary::{allocation_for, AllocationSummary};
use crate::models::{
    Agent, AgentStatus, Beneficiary, Gender, InsuredPerson, PaymentStatus, PersonStatus, Policy,
    PolicyStatus, PolicyType, PremiumPayment, Relationship, User, UserRole, UserStatus,
};

/// Counts keyed by wire label, with every known label present (zero if unused).
fn count_by<K, T>(all: &[K], items: &[T], key: impl Fn(&T) -> K) -> BTreeMap<String, usize>
where
    K: Copy + PartialEq + std::fmt::Display,
{
    all.iter()
        .map(|label| {
            let count = items.iter().filter(|item| key(item) == *label).count();
            (label.to_string(), count)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub total_coverage: f64,
    pub annual_premium: f64,
}

pub fn policy_stats(policies: &[Policy]) -> PolicyStats {
    PolicyStats {
        total: policies.len(),
        by_status: count_by(PolicyStatus::ALL, policies, |p| p.status),
        by_type: count_by(PolicyType::ALL, policies, |p| p.policy_type),
        total_coverage: policies.iter().map(|p| p.coverage_amount).sum(),
        annual_premium: policies.iter().map(Policy::annual_premium).sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredPersonStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_gender: BTreeMap<String, usize>,
    pub by_age_band: BTreeMap<String, usize>,
}

const AGE_BANDS: &[(&str, u32, u32)] = &[
    ("<25", 0, 24),
    ("25-39", 25, 39),
    ("40-59", 40, 59),
    ("60+", 60, u32::MAX),
];

pub fn insured_person_stats(persons: &[InsuredPerson], today: NaiveDate) -> InsuredPersonStats {
    let by_age_band = AGE_BANDS
        .iter()
        .map(|(label, low, high)| {
            let count = persons
                .iter()
                .filter(|p| (*low..=*high).contains(&p.age_on(today)))
                .count();
            (label.to_string(), count)
        })
        .collect();

    InsuredPersonStats {
        total: persons.len(),
        by_status: count_by(PersonStatus::ALL, persons, |p| p.status),
        by_gender: count_by(Gender::ALL, persons, |p| p.gender),
        by_age_band,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAmount {
    /// `YYYY-MM`
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub total: usize,
    pub total_collected: f64,
    pub total_outstanding: f64,
    pub by_status: BTreeMap<String, usize>,
    pub monthly_collections: Vec<MonthlyAmount>,
}

pub fn payment_stats(payments: &[PremiumPayment]) -> PaymentStats {
    let sum_where = |pred: &dyn Fn(PaymentStatus) -> bool| -> f64 {
        payments
            .iter()
            .filter(|p| pred(p.status))
            .map(|p| p.amount)
            .sum()
    };

    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.status == PaymentStatus::Paid) {
        let day = payment.paid_date.unwrap_or(payment.due_date);
        let key = format!("{:04}-{:02}", day.year(), day.month());
        *monthly.entry(key).or_default() += payment.amount;
    }

    PaymentStats {
        total: payments.len(),
        total_collected: sum_where(&|s| s == PaymentStatus::Paid),
        total_outstanding: sum_where(&|s| {
            matches!(s, PaymentStatus::Pending | PaymentStatus::Overdue)
        }),
        by_status: count_by(PaymentStatus::ALL, payments, |p| p.status),
        monthly_collections: monthly
            .into_iter()
            .map(|(month, amount)| MonthlyAmount { month, amount })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPolicyCount {
    pub agent_id: Uuid,
    pub agent_code: String,
    pub full_name: String,
    pub policy_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub policies_per_agent: Vec<AgentPolicyCount>,
}

pub fn agent_stats(agents: &[Agent], policies: &[Policy]) -> AgentStats {
    let mut policies_per_agent: Vec<AgentPolicyCount> = agents
        .iter()
        .map(|agent| AgentPolicyCount {
            agent_id: agent.id,
            agent_code: agent.agent_code.clone(),
            full_name: agent.full_name.clone(),
            policy_count: policies.iter().filter(|p| p.agent_id == agent.id).count(),
        })
        .collect();
    // Stable sort keeps agent order among ties
    policies_per_agent.sort_by(|a, b| b.policy_count.cmp(&a.policy_count));

    AgentStats {
        total: agents.len(),
        by_status: count_by(AgentStatus::ALL, agents, |a| a.status),
        policies_per_agent,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryStats {
    pub total: usize,
    pub by_relationship: BTreeMap<String, usize>,
    /// Policies whose shares do not total 100, including those with none.
    pub unbalanced_policies: Vec<AllocationSummary>,
}

pub fn beneficiary_stats(policies: &[Policy], beneficiaries: &[Beneficiary]) -> BeneficiaryStats {
    BeneficiaryStats {
        total: beneficiaries.len(),
        by_relationship: count_by(Relationship::ALL, beneficiaries, |b| b.relationship),
        unbalanced_policies: policies
            .iter()
            .map(|policy| allocation_for(policy.id, beneficiaries))
            .filter(|summary| !summary.balanced)
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub by_role: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

pub fn user_stats(users: &[User]) -> UserStats {
    UserStats {
        total: users.len(),
        by_role: count_by(UserRole::ALL, users, |u| u.role),
        by_status: count_by(UserStatus::ALL, users, |u| u.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::{self, demo_data};

    #[test]
    fn test_policy_stats_on_demo_data() {
        let data = demo_data();
        let stats = policy_stats(&data.policies);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.by_status["ACTIVE"], 4);
        assert_eq!(stats.by_status["EXPIRED"], 1);
        assert_eq!(stats.by_type["HEALTH"], 2);
        assert_eq!(stats.by_status.values().sum::<usize>(), 8);
        assert_eq!(stats.total_coverage, 3_300_000_000.0);
    }

    #[test]
    fn test_unused_labels_are_zero() {
        let stats = policy_stats(&[]);
        assert_eq!(stats.by_status.len(), PolicyStatus::ALL.len());
        assert!(stats.by_status.values().all(|c| *c == 0));
        assert_eq!(stats.annual_premium, 0.0);
    }

    #[test]
    fn test_payment_totals_and_monthly_series() {
        let data = demo_data();
        let stats = payment_stats(&data.premium_payments);
        assert_eq!(stats.by_status["PAID"], 8);
        assert_eq!(stats.by_status["OVERDUE"], 2);
        assert_eq!(
            stats.total_outstanding,
            2_500_000.0 + 4_800_000.0 + 18_000_000.0 + 1_100_000.0
        );

        let months: Vec<_> = stats.monthly_collections.iter().map(|m| m.month.as_str()).collect();
        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);
        assert_eq!(months[0], "2023-12");

        let collected: f64 = stats.monthly_collections.iter().map(|m| m.amount).sum();
        assert_eq!(collected, stats.total_collected);
    }

    #[test]
    fn test_agent_ranking() {
        let data = demo_data();
        let stats = agent_stats(&data.agents, &data.policies);
        assert_eq!(stats.total, 4);
        let counts: Vec<_> = stats.policies_per_agent.iter().map(|a| a.policy_count).collect();
        assert_eq!(counts, vec![3, 3, 1, 1]);
        assert_eq!(stats.policies_per_agent[0].agent_id, seed::agent_id(0));
    }

    #[test]
    fn test_unbalanced_allocations_are_flagged() {
        let data = demo_data();
        let stats = beneficiary_stats(&data.policies, &data.beneficiaries);
        let flagged: Vec<_> = stats.unbalanced_policies.iter().map(|s| s.policy_id).collect();
        assert_eq!(
            flagged,
            vec![seed::policy_id(2), seed::policy_id(4), seed::policy_id(7)]
        );
        assert_eq!(stats.unbalanced_policies[0].total_percentage, 80.0);
    }

    #[test]
    fn test_policy_without_beneficiaries_is_unbalanced() {
        let data = demo_data();
        let stats = beneficiary_stats(&data.policies, &data.beneficiaries);
        let summary = stats
            .unbalanced_policies
            .iter()
            .find(|s| s.policy_id == seed::policy_id(4))
            .unwrap();
        assert_eq!(summary.beneficiary_count, 0);
        assert_eq!(*summary, allocation_for(seed::policy_id(4), &data.beneficiaries));
    }

    #[test]
    fn test_age_bands() {
        let data = demo_data();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let stats = insured_person_stats(&data.insured_persons, today);
        assert_eq!(stats.by_age_band["<25"], 1);
        assert_eq!(stats.by_age_band["25-39"], 3);
        assert_eq!(stats.by_age_band["40-59"], 1);
        assert_eq!(stats.by_age_band["60+"], 1);
        assert_eq!(stats.by_gender["OTHER"], 1);
    }

    #[test]
    fn test_user_counts() {
        let data = demo_data();
        let stats = user_stats(&data.users);
        assert_eq!(stats.by_role["ADMIN"], 1);
        assert_eq!(stats.by_status["INACTIVE"], 1);
    }
}
