use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::{category_matches, reference_matches, ListFilters, Listable, SortValue};
use crate::resource::{missing_reference, Resource};
use crate::store::{Collection, Record, Store};
use crate::validation::Validator;

labelled_enum! {
    pub enum PolicyType {
        WholeLife => "WHOLE_LIFE",
        TermLife => "TERM_LIFE",
        Endowment => "ENDOWMENT",
        Health => "HEALTH",
        Accident => "ACCIDENT",
    }
}

labelled_enum! {
    pub enum PolicyStatus {
        Pending => "PENDING",
        Active => "ACTIVE",
        Lapsed => "LAPSED",
        Cancelled => "CANCELLED",
        Expired => "EXPIRED",
    }
}

labelled_enum! {
    pub enum PremiumFrequency {
        Monthly => "MONTHLY",
        Quarterly => "QUARTERLY",
        SemiAnnual => "SEMI_ANNUAL",
        Annual => "ANNUAL",
    }
}

impl PremiumFrequency {
    pub fn payments_per_year(self) -> u32 {
        match self {
            PremiumFrequency::Monthly => 12,
            PremiumFrequency::Quarterly => 4,
            PremiumFrequency::SemiAnnual => 2,
            PremiumFrequency::Annual => 1,
        }
    }
}

labelled_enum! {
    pub enum PolicySortKey {
        PolicyNumber => "policyNumber",
        PolicyType => "policyType",
        Status => "status",
        CoverageAmount => "coverageAmount",
        PremiumAmount => "premiumAmount",
        StartDate => "startDate",
        EndDate => "endDate",
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub policy_number: String,
    pub insured_person_id: Uuid,
    pub agent_id: Uuid,
    pub policy_type: PolicyType,
    pub status: PolicyStatus,
    pub coverage_amount: f64,
    pub premium_amount: f64,
    pub premium_frequency: PremiumFrequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Premium normalised to a yearly figure.
    pub fn annual_premium(&self) -> f64 {
        self.premium_amount * f64::from(self.premium_frequency.payments_per_year())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    pub policy_number: String,
    pub insured_person_id: Uuid,
    pub agent_id: Uuid,
    pub policy_type: PolicyType,
    pub status: Option<PolicyStatus>,
    pub coverage_amount: f64,
    pub premium_amount: f64,
    pub premium_frequency: PremiumFrequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicy {
    pub policy_number: Option<String>,
    pub insured_person_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub policy_type: Option<PolicyType>,
    pub status: Option<PolicyStatus>,
    pub coverage_amount: Option<f64>,
    pub premium_amount: Option<f64>,
    pub premium_frequency: Option<PremiumFrequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Record for Policy {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for Policy {
    type SortKey = PolicySortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.policy_number.as_str(), self.notes.as_deref().unwrap_or_default()]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.status.as_deref(), self.status.as_str())
            && category_matches(filters.kind.as_deref(), self.policy_type.as_str())
            && reference_matches(filters.agent_id, self.agent_id)
            && reference_matches(filters.insured_person_id, self.insured_person_id)
    }

    fn sort_value(&self, key: PolicySortKey) -> SortValue<'_> {
        match key {
            PolicySortKey::PolicyNumber => SortValue::Text(&self.policy_number),
            PolicySortKey::PolicyType => SortValue::Text(self.policy_type.as_str()),
            PolicySortKey::Status => SortValue::Text(self.status.as_str()),
            PolicySortKey::CoverageAmount => SortValue::Number(self.coverage_amount),
            PolicySortKey::PremiumAmount => SortValue::Number(self.premium_amount),
            PolicySortKey::StartDate => SortValue::Date(self.start_date),
            PolicySortKey::EndDate => self.end_date.into(),
            PolicySortKey::CreatedAt => SortValue::Timestamp(self.created_at),
            PolicySortKey::UpdatedAt => SortValue::Timestamp(self.updated_at),
        }
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }

    fn primary_amount(&self) -> Option<f64> {
        Some(self.premium_amount)
    }
}

#[async_trait]
impl Resource for Policy {
    const LABEL: &'static str = "Policy";

    type Create = CreatePolicy;
    type Update = UpdatePolicy;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.policies
    }

    fn from_create(input: CreatePolicy, id: Uuid, now: DateTime<Utc>) -> Self {
        Policy {
            id,
            policy_number: input.policy_number.trim().to_string(),
            insured_person_id: input.insured_person_id,
            agent_id: input.agent_id,
            policy_type: input.policy_type,
            status: input.status.unwrap_or(PolicyStatus::Pending),
            coverage_amount: input.coverage_amount,
            premium_amount: input.premium_amount,
            premium_frequency: input.premium_frequency,
            start_date: input.start_date,
            end_date: input.end_date,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdatePolicy, now: DateTime<Utc>) {
        merge_fields!(self, patch;
            policy_number, insured_person_id, agent_id, policy_type, status,
            coverage_amount, premium_amount, premium_frequency, start_date;
            optional end_date, notes);
        self.updated_at = now;
    }

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("policyNumber", &self.policy_number)
            .max_len("policyNumber", &self.policy_number, 30)
            .positive("coverageAmount", self.coverage_amount)
            .positive("premiumAmount", self.premium_amount)
            .check(
                "premiumAmount",
                self.premium_amount <= self.coverage_amount,
                "Premium cannot exceed the coverage amount",
            )
            .date_after("endDate", self.start_date, self.end_date)
            .max_len("notes", self.notes.as_deref().unwrap_or_default(), 1000);
        v.finish()
    }

    async fn check_references(&self, store: &Store) -> Result<(), AppError> {
        if store.insured_persons.find(self.insured_person_id).await.is_none() {
            return Err(missing_reference(
                "insuredPersonId",
                "Insured person",
                self.insured_person_id,
            ));
        }
        if store.agents.find(self.agent_id).await.is_none() {
            return Err(missing_reference("agentId", "Agent", self.agent_id));
        }
        let number = self.policy_number.clone();
        if store
            .policies
            .exists_other(self.id, |p| p.policy_number.eq_ignore_ascii_case(&number))
            .await
        {
            return Err(AppError::Conflict(format!(
                "Policy number {} is already in use",
                self.policy_number
            )));
        }
        Ok(())
    }
}
