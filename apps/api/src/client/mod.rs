//! Typed HTTP client for the back-office API, plus the per-entity CRUD hooks
//! a UI drives.

use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::files::StoredFile;
use crate::handlers::policies::PolicyDetails;
use crate::models::{
    agent::{CreateAgent, UpdateAgent},
    beneficiary::{CreateBeneficiary, UpdateBeneficiary},
    insured_person::{CreateInsuredPerson, UpdateInsuredPerson},
    policy::{CreatePolicy, UpdatePolicy},
    premium_payment::{CreatePremiumPayment, UpdatePremiumPayment},
    user::{CreateUser, UpdateUser},
    Agent, Beneficiary, InsuredPerson, Policy, PremiumPayment, User,
};
use crate::response::ApiResponse;
use crate::stats::{
    AgentStats, BeneficiaryStats, InsuredPersonStats, PaymentStats, PolicyStats, UserStats,
};

pub mod hooks;
pub mod messages;
pub mod notify;

pub use hooks::{CrudHook, LoadingState};
pub use messages::{Action, Entity, Locale};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Server error code, if the server answered at all.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Text suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(e) if e.is_connect() => "server unreachable".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// An entity the API serves under `PATH`.
pub trait Endpoint: DeserializeOwned + Send + Sync + 'static {
    const PATH: &'static str;
    const ENTITY: Entity;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;
    type Stats: DeserializeOwned;
}

macro_rules! endpoint {
    ($model:ty, $path:literal, $entity:ident, $create:ty, $update:ty, $stats:ty) => {
        impl Endpoint for $model {
            const PATH: &'static str = $path;
            const ENTITY: Entity = Entity::$entity;
            type Create = $create;
            type Update = $update;
            type Stats = $stats;
        }
    };
}

endpoint!(Policy, "/api/policies", Policy, CreatePolicy, UpdatePolicy, PolicyStats);
endpoint!(
    InsuredPerson,
    "/api/insured-persons",
    InsuredPerson,
    CreateInsuredPerson,
    UpdateInsuredPerson,
    InsuredPersonStats
);
endpoint!(
    PremiumPayment,
    "/api/premium-payments",
    PremiumPayment,
    CreatePremiumPayment,
    UpdatePremiumPayment,
    PaymentStats
);
endpoint!(Agent, "/api/agents", Agent, CreateAgent, UpdateAgent, AgentStats);
endpoint!(
    Beneficiary,
    "/api/beneficiaries",
    Beneficiary,
    CreateBeneficiary,
    UpdateBeneficiary,
    BeneficiaryStats
);
endpoint!(User, "/api/users", User, CreateUser, UpdateUser, UserStats);

/// Query string for list calls. Unset values are left to server defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pairs: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, page: usize) -> Self {
        self.filter("page", page.to_string())
    }

    pub fn limit(self, limit: usize) -> Self {
        self.filter("limit", limit.to_string())
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.filter("search", term)
    }

    pub fn sort(self, key: impl Into<String>, order: impl Into<String>) -> Self {
        self.filter("sortBy", key).filter("sortOrder", order)
    }

    /// Any other query key, e.g. `status` or `fromDate`.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decodes the envelope, or turns a non-2xx answer into `ClientError::Api`.
    async fn decode<D: DeserializeOwned>(response: Response) -> Result<D, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<ErrorBody>(&bytes).ok();
            let code = body
                .as_ref()
                .and_then(|b| b.code.clone())
                .unwrap_or_else(|| "HTTP_ERROR".to_string());
            let message = body
                .and_then(|b| b.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            debug!("API call failed with {status}: {message}");
            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn list<T: Endpoint>(
        &self,
        params: &ListParams,
    ) -> Result<ApiResponse<Vec<T>>, ClientError> {
        let response = self
            .client
            .get(self.url(T::PATH))
            .query(params.pairs())
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn get<T: Endpoint>(&self, id: Uuid) -> Result<T, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("{}/{id}", T::PATH)))
            .send()
            .await?;
        let envelope: ApiResponse<T> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    pub async fn create<T: Endpoint>(
        &self,
        input: &T::Create,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = self
            .client
            .post(self.url(T::PATH))
            .json(input)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn update<T: Endpoint>(
        &self,
        id: Uuid,
        patch: &T::Update,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("{}/{id}", T::PATH)))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn delete<T: Endpoint>(&self, id: Uuid) -> Result<ApiResponse<T>, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("{}/{id}", T::PATH)))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn stats<T: Endpoint>(&self) -> Result<T::Stats, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("{}/stats", T::PATH)))
            .send()
            .await?;
        let envelope: ApiResponse<T::Stats> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    pub async fn policy_details(&self, id: Uuid) -> Result<PolicyDetails, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("{}/{id}/details", Policy::PATH)))
            .send()
            .await?;
        let envelope: ApiResponse<PolicyDetails> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse<StoredFile>, ClientError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.url("/api/files"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }
}
