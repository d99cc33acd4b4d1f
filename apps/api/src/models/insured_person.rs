use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::{category_matches, ListFilters, Listable, SortValue};
use crate::resource::Resource;
use crate::store::{Collection, Record, Store};
use crate::validation::Validator;

labelled_enum! {
    pub enum Gender {
        Male => "MALE",
        Female => "FEMALE",
        Other => "OTHER",
    }
}

labelled_enum! {
    pub enum PersonStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

labelled_enum! {
    pub enum InsuredPersonSortKey {
        FullName => "fullName",
        IdentityNumber => "identityNumber",
        DateOfBirth => "dateOfBirth",
        Email => "email",
        Gender => "gender",
        Status => "status",
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredPerson {
    pub id: Uuid,
    pub full_name: String,
    pub identity_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub occupation: Option<String>,
    pub status: PersonStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsuredPerson {
    /// Completed years of age on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.date_of_birth.year();
        if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInsuredPerson {
    pub full_name: String,
    pub identity_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub occupation: Option<String>,
    pub status: Option<PersonStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInsuredPerson {
    pub full_name: Option<String>,
    pub identity_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub status: Option<PersonStatus>,
}

impl Record for InsuredPerson {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for InsuredPerson {
    type SortKey = InsuredPersonSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.identity_number.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
        ]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.status.as_deref(), self.status.as_str())
            && category_matches(filters.gender.as_deref(), self.gender.as_str())
    }

    fn sort_value(&self, key: InsuredPersonSortKey) -> SortValue<'_> {
        match key {
            InsuredPersonSortKey::FullName => SortValue::Text(&self.full_name),
            InsuredPersonSortKey::IdentityNumber => SortValue::Text(&self.identity_number),
            InsuredPersonSortKey::DateOfBirth => SortValue::Date(self.date_of_birth),
            InsuredPersonSortKey::Email => SortValue::Text(&self.email),
            InsuredPersonSortKey::Gender => SortValue::Text(self.gender.as_str()),
            InsuredPersonSortKey::Status => SortValue::Text(self.status.as_str()),
            InsuredPersonSortKey::CreatedAt => SortValue::Timestamp(self.created_at),
            InsuredPersonSortKey::UpdatedAt => SortValue::Timestamp(self.updated_at),
        }
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.date_of_birth)
    }
}

#[async_trait]
impl Resource for InsuredPerson {
    const LABEL: &'static str = "Insured person";

    type Create = CreateInsuredPerson;
    type Update = UpdateInsuredPerson;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.insured_persons
    }

    fn from_create(input: CreateInsuredPerson, id: Uuid, now: DateTime<Utc>) -> Self {
        InsuredPerson {
            id,
            full_name: input.full_name.trim().to_string(),
            identity_number: input.identity_number.trim().to_string(),
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            occupation: input.occupation,
            status: input.status.unwrap_or(PersonStatus::Active),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdateInsuredPerson, now: DateTime<Utc>) {
        merge_fields!(self, patch;
            full_name, identity_number, date_of_birth, gender, email, phone, address, status;
            optional occupation);
        self.updated_at = now;
    }

    fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("fullName", &self.full_name)
            .max_len("fullName", &self.full_name, 100)
            .identity_number("identityNumber", &self.identity_number)
            .not_in_future("dateOfBirth", self.date_of_birth, today)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .required("address", &self.address)
            .max_len("address", &self.address, 255);
        v.finish()
    }

    async fn check_references(&self, store: &Store) -> Result<(), AppError> {
        let identity = self.identity_number.trim().to_string();
        if store
            .insured_persons
            .exists_other(self.id, |p| p.identity_number.trim() == identity)
            .await
        {
            return Err(AppError::Conflict(format!(
                "Identity number {identity} is already registered"
            )));
        }
        Ok(())
    }
}
