use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::{category_matches, ListFilters, Listable, SortValue};
use crate::resource::Resource;
use crate::store::{Collection, Record, Store};
use crate::validation::Validator;

labelled_enum! {
    pub enum AgentStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Suspended => "SUSPENDED",
    }
}

labelled_enum! {
    pub enum AgentSortKey {
        AgentCode => "agentCode",
        FullName => "fullName",
        Email => "email",
        LicenseNumber => "licenseNumber",
        LicenseExpiry => "licenseExpiry",
        CommissionRate => "commissionRate",
        Status => "status",
        CreatedAt => "createdAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub agent_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    /// Percent of collected premium.
    pub commission_rate: f64,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgent {
    pub agent_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub commission_rate: f64,
    pub status: Option<AgentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgent {
    pub agent_code: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub commission_rate: Option<f64>,
    pub status: Option<AgentStatus>,
}

impl Record for Agent {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for Agent {
    type SortKey = AgentSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.agent_code.as_str(),
            self.full_name.as_str(),
            self.email.as_str(),
            self.license_number.as_str(),
        ]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.status.as_deref(), self.status.as_str())
    }

    fn sort_value(&self, key: AgentSortKey) -> SortValue<'_> {
        match key {
            AgentSortKey::AgentCode => SortValue::Text(&self.agent_code),
            AgentSortKey::FullName => SortValue::Text(&self.full_name),
            AgentSortKey::Email => SortValue::Text(&self.email),
            AgentSortKey::LicenseNumber => SortValue::Text(&self.license_number),
            AgentSortKey::LicenseExpiry => SortValue::Date(self.license_expiry),
            AgentSortKey::CommissionRate => SortValue::Number(self.commission_rate),
            AgentSortKey::Status => SortValue::Text(self.status.as_str()),
            AgentSortKey::CreatedAt => SortValue::Timestamp(self.created_at),
        }
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.license_expiry)
    }

    fn primary_amount(&self) -> Option<f64> {
        Some(self.commission_rate)
    }
}

#[async_trait]
impl Resource for Agent {
    const LABEL: &'static str = "Agent";

    type Create = CreateAgent;
    type Update = UpdateAgent;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.agents
    }

    fn from_create(input: CreateAgent, id: Uuid, now: DateTime<Utc>) -> Self {
        Agent {
            id,
            agent_code: input.agent_code.trim().to_uppercase(),
            full_name: input.full_name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            license_number: input.license_number.trim().to_string(),
            license_expiry: input.license_expiry,
            commission_rate: input.commission_rate,
            status: input.status.unwrap_or(AgentStatus::Active),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdateAgent, now: DateTime<Utc>) {
        merge_fields!(self, patch;
            agent_code, full_name, email, phone, license_number,
            license_expiry, commission_rate, status);
        self.updated_at = now;
    }

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("agentCode", &self.agent_code)
            .max_len("agentCode", &self.agent_code, 20)
            .required("fullName", &self.full_name)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .required("licenseNumber", &self.license_number)
            .in_range("commissionRate", self.commission_rate, 0.0, 100.0);
        v.finish()
    }

    async fn check_references(&self, store: &Store) -> Result<(), AppError> {
        let code = self.agent_code.clone();
        if store
            .agents
            .exists_other(self.id, |a| a.agent_code.eq_ignore_ascii_case(&code))
            .await
        {
            return Err(AppError::Conflict(format!(
                "Agent code {} is already in use",
                self.agent_code
            )));
        }
        let license = self.license_number.clone();
        if store
            .agents
            .exists_other(self.id, |a| a.license_number == license)
            .await
        {
            return Err(AppError::Conflict(format!(
                "License number {} is already registered",
                self.license_number
            )));
        }
        Ok(())
    }
}
