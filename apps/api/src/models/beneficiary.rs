use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::{category_matches, reference_matches, ListFilters, Listable, SortValue};
use crate::resource::{missing_reference, Resource};
use crate::store::{Collection, Record, Store};
use crate::validation::{is_valid_identity_number, Validator};

/// Shares within this distance of 100 count as fully allocated.
const ALLOCATION_TOLERANCE: f64 = 0.01;

labelled_enum! {
    pub enum Relationship {
        Spouse => "SPOUSE",
        Child => "CHILD",
        Parent => "PARENT",
        Sibling => "SIBLING",
        Other => "OTHER",
    }
}

labelled_enum! {
    pub enum BeneficiarySortKey {
        FullName => "fullName",
        Relationship => "relationship",
        Percentage => "percentage",
        CreatedAt => "createdAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub full_name: String,
    pub relationship: Relationship,
    pub identity_number: Option<String>,
    /// Share of the payout, in percent.
    pub percentage: f64,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeneficiary {
    pub policy_id: Uuid,
    pub full_name: String,
    pub relationship: Relationship,
    pub identity_number: Option<String>,
    pub percentage: f64,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBeneficiary {
    pub policy_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub relationship: Option<Relationship>,
    pub identity_number: Option<String>,
    pub percentage: Option<f64>,
    pub phone: Option<String>,
}

/// How a policy's payout is split across its beneficiaries.
///
/// Shares are only checked one at a time on write; an allocation that does not
/// add up to 100 is reported here rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub policy_id: Uuid,
    pub beneficiary_count: usize,
    pub total_percentage: f64,
    pub balanced: bool,
}

pub fn allocation_for(policy_id: Uuid, beneficiaries: &[Beneficiary]) -> AllocationSummary {
    let shares: Vec<f64> = beneficiaries
        .iter()
        .filter(|b| b.policy_id == policy_id)
        .map(|b| b.percentage)
        .collect();
    let total_percentage: f64 = shares.iter().sum();
    AllocationSummary {
        policy_id,
        beneficiary_count: shares.len(),
        total_percentage,
        balanced: !shares.is_empty() && (total_percentage - 100.0).abs() < ALLOCATION_TOLERANCE,
    }
}

impl Record for Beneficiary {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for Beneficiary {
    type SortKey = BeneficiarySortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.identity_number.as_deref().unwrap_or_default(),
        ]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.relationship.as_deref(), self.relationship.as_str())
            && reference_matches(filters.policy_id, self.policy_id)
    }

    fn sort_value(&self, key: BeneficiarySortKey) -> SortValue<'_> {
        match key {
            BeneficiarySortKey::FullName => SortValue::Text(&self.full_name),
            BeneficiarySortKey::Relationship => SortValue::Text(self.relationship.as_str()),
            BeneficiarySortKey::Percentage => SortValue::Number(self.percentage),
            BeneficiarySortKey::CreatedAt => SortValue::Timestamp(self.created_at),
        }
    }

    fn primary_amount(&self) -> Option<f64> {
        Some(self.percentage)
    }
}

#[async_trait]
impl Resource for Beneficiary {
    const LABEL: &'static str = "Beneficiary";

    type Create = CreateBeneficiary;
    type Update = UpdateBeneficiary;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.beneficiaries
    }

    fn from_create(input: CreateBeneficiary, id: Uuid, now: DateTime<Utc>) -> Self {
        Beneficiary {
            id,
            policy_id: input.policy_id,
            full_name: input.full_name.trim().to_string(),
            relationship: input.relationship,
            identity_number: input.identity_number,
            percentage: input.percentage,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdateBeneficiary, now: DateTime<Utc>) {
        merge_fields!(self, patch;
            policy_id, full_name, relationship, percentage;
            optional identity_number, phone);
        self.updated_at = now;
    }

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("fullName", &self.full_name)
            .check(
                "percentage",
                self.percentage.is_finite() && self.percentage > 0.0 && self.percentage <= 100.0,
                "Percentage must be greater than 0 and at most 100",
            )
            .optional_phone("phone", self.phone.as_deref());
        if let Some(identity) = self.identity_number.as_deref().filter(|s| !s.trim().is_empty()) {
            v.check(
                "identityNumber",
                is_valid_identity_number(identity),
                "Identity number must be 9 or 12 digits",
            );
        }
        v.finish()
    }

    async fn check_references(&self, store: &Store) -> Result<(), AppError> {
        if store.policies.find(self.policy_id).await.is_none() {
            return Err(missing_reference("policyId", "Policy", self.policy_id));
        }
        Ok(())
    }
}
