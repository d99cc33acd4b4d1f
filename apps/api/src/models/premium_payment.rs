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
    pub enum PaymentMethod {
        BankTransfer => "BANK_TRANSFER",
        CreditCard => "CREDIT_CARD",
        Cash => "CASH",
        Check => "CHECK",
    }
}

labelled_enum! {
    pub enum PaymentStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Overdue => "OVERDUE",
        Failed => "FAILED",
        Refunded => "REFUNDED",
    }
}

labelled_enum! {
    pub enum PaymentSortKey {
        Amount => "amount",
        DueDate => "dueDate",
        PaidDate => "paidDate",
        PaymentMethod => "paymentMethod",
        Status => "status",
        ReferenceNumber => "referenceNumber",
        CreatedAt => "createdAt",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumPayment {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePremiumPayment {
    pub policy_id: Uuid,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub status: Option<PaymentStatus>,
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePremiumPayment {
    pub policy_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub reference_number: Option<String>,
}

impl Record for PremiumPayment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for PremiumPayment {
    type SortKey = PaymentSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.reference_number.as_deref().unwrap_or_default(),
            self.payment_method.as_str(),
        ]
    }

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        category_matches(filters.status.as_deref(), self.status.as_str())
            && category_matches(filters.payment_method.as_deref(), self.payment_method.as_str())
            && reference_matches(filters.policy_id, self.policy_id)
    }

    fn sort_value(&self, key: PaymentSortKey) -> SortValue<'_> {
        match key {
            PaymentSortKey::Amount => SortValue::Number(self.amount),
            PaymentSortKey::DueDate => SortValue::Date(self.due_date),
            PaymentSortKey::PaidDate => self.paid_date.into(),
            PaymentSortKey::PaymentMethod => SortValue::Text(self.payment_method.as_str()),
            PaymentSortKey::Status => SortValue::Text(self.status.as_str()),
            PaymentSortKey::ReferenceNumber => self.reference_number.as_deref().into(),
            PaymentSortKey::CreatedAt => SortValue::Timestamp(self.created_at),
        }
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.due_date)
    }

    fn primary_amount(&self) -> Option<f64> {
        Some(self.amount)
    }
}

#[async_trait]
impl Resource for PremiumPayment {
    const LABEL: &'static str = "Premium payment";

    type Create = CreatePremiumPayment;
    type Update = UpdatePremiumPayment;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.premium_payments
    }

    fn from_create(input: CreatePremiumPayment, id: Uuid, now: DateTime<Utc>) -> Self {
        PremiumPayment {
            id,
            policy_id: input.policy_id,
            amount: input.amount,
            due_date: input.due_date,
            paid_date: input.paid_date,
            payment_method: input.payment_method,
            status: input.status.unwrap_or(PaymentStatus::Pending),
            reference_number: input.reference_number,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: UpdatePremiumPayment, now: DateTime<Utc>) {
        merge_fields!(self, patch;
            policy_id, amount, due_date, payment_method, status;
            optional paid_date, reference_number);
        self.updated_at = now;
    }

    fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.positive("amount", self.amount).check(
            "paidDate",
            self.status != PaymentStatus::Paid || self.paid_date.is_some(),
            "A paid payment needs a payment date",
        );
        if let Some(paid) = self.paid_date {
            v.not_in_future("paidDate", paid, today);
        }
        if let Some(reference) = &self.reference_number {
            v.max_len("referenceNumber", reference, 50);
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
