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
    pub enum UserRole {
        Admin => "ADMIN",
        Manager => "MANAGER",
        Agent => "AGENT",
        Viewer => "VIEWER",
    }
}

labelled_enum! {
    pub enum UserStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

labelled_enum! {
    pub enum UserSortKey {
        Username => "username",
        FullName => "fullName",
        Email => "email",
        Role => "role",
        Status => "status",
        LastLoginAt => "lastLoginAt",
        CreatedAt => "createdAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

fn is_valid_username(value: &str) -> bool {
    (3..=32).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for User {
    type SortKey = UserSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.username.as_str(),
            self.full_name.as_str(),
            self.email.as_str(),
        ]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.status.as_deref(), self.status.as_str())
            && category_matches(filters.role.as_deref(), self.role.as_str())
    }

    fn sort_value(&self, key: UserSortKey) -> SortValue<'_> {
        match key {
            UserSortKey::Username => SortValue::Text(&self.username),
            UserSortKey::FullName => SortValue::Text(&self.full_name),
            UserSortKey::Email => SortValue::Text(&self.email),
            UserSortKey::Role => SortValue::Text(self.role.as_str()),
            UserSortKey::Status => SortValue::Text(self.status.as_str()),
            UserSortKey::LastLoginAt => self.last_login_at.into(),
            UserSortKey::CreatedAt => SortValue::Timestamp(self.created_at),
        }
    }
}

#[async_trait]
impl Resource for User {
    const LABEL: &'static str = "User";

    type Create = CreateUser;
    type Update = UpdateUser;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.users
    }

    fn from_create(input: CreateUser, id: Uuid, now: DateTime<Utc>) -> Self {
        User {
            id,
            username: input.username.trim().to_lowercase(),
            full_name: input.full_name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            role: input.role,
            status: input.status.unwrap_or(UserStatus::Active),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdateUser, now: DateTime<Utc>) {
        merge_fields!(self, patch; username, full_name, email, role, status);
        self.updated_at = now;
    }

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.check(
            "username",
            is_valid_username(&self.username),
            "Username must be 3-32 letters, digits, '.', '_' or '-'",
        )
        .required("fullName", &self.full_name)
        .email("email", &self.email);
        v.finish()
    }

    async fn check_references(&self, store: &Store) -> Result<(), AppError> {
        let username = self.username.clone();
        let email = self.email.clone();
        if store
            .users
            .exists_other(self.id, |u| u.username.eq_ignore_ascii_case(&username))
            .await
        {
            return Err(AppError::Conflict(format!(
                "Username {} is taken",
                self.username
            )));
        }
        if store
            .users
            .exists_other(self.id, |u| u.email.eq_ignore_ascii_case(&email))
            .await
        {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                self.email
            )));
        }
        Ok(())
    }
}
