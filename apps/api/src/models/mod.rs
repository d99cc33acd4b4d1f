//! Entity records, their create/update payloads and sort keys.

/// Declares a `Copy` enum whose serde label, `Display` and case-insensitive
/// `FromStr` all use the same wire string.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let raw = raw.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(raw))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), raw))
            }
        }
    };
}

/// Shallow merge of `Option` patch fields into a record. Fields after
/// `optional` are themselves optional on the record.
macro_rules! merge_fields {
    ($target:expr, $patch:expr; $($field:ident),* $(; optional $($opt:ident),*)?) => {{
        $(if let Some(value) = $patch.$field {
            $target.$field = value;
        })*
        $($(if let Some(value) = $patch.$opt {
            $target.$opt = Some(value);
        })*)?
    }};
}

pub mod agent;
pub mod beneficiary;
pub mod insured_person;
pub mod policy;
pub mod premium_payment;
pub mod user;

pub use agent::{Agent, AgentStatus};
pub use beneficiary::{Beneficiary, Relationship};
pub use insured_person::{Gender, InsuredPerson, PersonStatus};
pub use policy::{Policy, PolicyStatus, PolicyType, PremiumFrequency};
pub use premium_payment::{PaymentMethod, PaymentStatus, PremiumPayment};
pub use user::{User, UserRole, UserStatus};
