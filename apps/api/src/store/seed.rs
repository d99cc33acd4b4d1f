//! Demo data loaded at start-up when `SEED_DEMO_DATA` is on.
//!
//! Ids are fixed so links between records stay stable across restarts.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Agent, AgentStatus, Beneficiary, Gender, InsuredPerson, PaymentMethod, PaymentStatus,
    PersonStatus, Policy, PolicyStatus, PolicyType, PremiumFrequency, PremiumPayment,
    Relationship, User, UserRole, UserStatus,
};

pub struct DemoData {
    pub agents: Vec<Agent>,
    pub insured_persons: Vec<InsuredPerson>,
    pub policies: Vec<Policy>,
    pub beneficiaries: Vec<Beneficiary>,
    pub premium_payments: Vec<PremiumPayment>,
    pub users: Vec<User>,
}

pub fn agent_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0a00_0000_0000_4000_8000_0000_0000_0000 + index)
}

pub fn insured_person_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0b00_0000_0000_4000_8000_0000_0000_0000 + index)
}

pub fn policy_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0c00_0000_0000_4000_8000_0000_0000_0000 + index)
}

pub fn beneficiary_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0d00_0000_0000_4000_8000_0000_0000_0000 + index)
}

pub fn payment_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0e00_0000_0000_4000_8000_0000_0000_0000 + index)
}

pub fn user_id(index: u128) -> Uuid {
    Uuid::from_u128(0x0f00_0000_0000_4000_8000_0000_0000_0000 + index)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(9, 0, 0).unwrap_or_default().and_utc()
}

pub fn demo_data() -> DemoData {
    DemoData {
        agents: agents(),
        insured_persons: insured_persons(),
        policies: policies(),
        beneficiaries: beneficiaries(),
        premium_payments: premium_payments(),
        users: users(),
    }
}

fn agents() -> Vec<Agent> {
    let rows = [
        (
            "AG-001",
            "Pham Minh Tuan",
            "tuan.pham@baohiem.vn",
            "0901234001",
            "LIC-2019-0457",
            date(2026, 12, 31),
            15.0,
            AgentStatus::Active,
        ),
        (
            "AG-002",
            "Vo Thi Hoa",
            "hoa.vo@baohiem.vn",
            "0901234002",
            "LIC-2020-1123",
            date(2027, 6, 30),
            12.5,
            AgentStatus::Active,
        ),
        (
            "AG-003",
            "Do Quang Huy",
            "huy.do@baohiem.vn",
            "0901234003",
            "LIC-2018-0032",
            date(2024, 3, 31),
            10.0,
            AgentStatus::Inactive,
        ),
        (
            "AG-004",
            "Bui Thanh Nam",
            "nam.bui@baohiem.vn",
            "0901234004",
            "LIC-2021-0789",
            date(2026, 9, 30),
            11.0,
            AgentStatus::Suspended,
        ),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (code, name, email, phone, license, expiry, rate, status))| Agent {
            id: agent_id(i as u128),
            agent_code: code.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            license_number: license.to_string(),
            license_expiry: expiry,
            commission_rate: rate,
            status,
            created_at: at(2023, 1, 10 + i as u32),
            updated_at: at(2023, 1, 10 + i as u32),
        })
        .collect()
}

fn insured_persons() -> Vec<InsuredPerson> {
    let rows = [
        (
            "Nguyen Van An",
            "079085001234",
            date(1985, 4, 12),
            Gender::Male,
            "an.nguyen@gmail.com",
            "0912345678",
            "25 Nguyen Hue, District 1, Ho Chi Minh City",
            Some("Engineer"),
            PersonStatus::Active,
        ),
        (
            "Tran Thi Bich",
            "001190005678",
            date(1990, 9, 3),
            Gender::Female,
            "bich.tran@gmail.com",
            "0987654321",
            "8 Hang Bai, Hoan Kiem, Ha Noi",
            Some("Accountant"),
            PersonStatus::Active,
        ),
        (
            "Le Hoang Cuong",
            "048075009012",
            date(1975, 1, 28),
            Gender::Male,
            "cuong.le@yahoo.com",
            "0905111222",
            "102 Bach Dang, Hai Chau, Da Nang",
            Some("Business owner"),
            PersonStatus::Active,
        ),
        (
            "Pham Thu Dung",
            "092001003456",
            date(2001, 11, 19),
            Gender::Female,
            "dung.pham@gmail.com",
            "0933444555",
            "14 Hoa Binh, Ninh Kieu, Can Tho",
            Some("Student"),
            PersonStatus::Active,
        ),
        (
            "Hoang Minh Em",
            "031960007890",
            date(1960, 7, 7),
            Gender::Male,
            "em.hoang@outlook.com",
            "0977888999",
            "3 Le Thanh Tong, Ngo Quyen, Hai Phong",
            None,
            PersonStatus::Inactive,
        ),
        (
            "Dang Ngoc Giao",
            "212345678",
            date(1998, 2, 14),
            Gender::Other,
            "giao.dang@gmail.com",
            "0966123456",
            "50 Tran Phu, Nha Trang, Khanh Hoa",
            Some("Designer"),
            PersonStatus::Active,
        ),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let (name, identity, dob, gender, email, phone, address, occupation, status) = row;
            InsuredPerson {
                id: insured_person_id(i as u128),
                full_name: name.to_string(),
                identity_number: identity.to_string(),
                date_of_birth: dob,
                gender,
                email: email.to_string(),
                phone: phone.to_string(),
                address: address.to_string(),
                occupation: occupation.map(str::to_string),
                status,
                created_at: at(2023, 2, 1 + i as u32),
                updated_at: at(2023, 2, 1 + i as u32),
            }
        })
        .collect()
}

fn policies() -> Vec<Policy> {
    use PolicyStatus as S;
    use PolicyType as T;
    use PremiumFrequency as F;
    let rows = [
        (
            "POL-2023-0001",
            0,
            0,
            T::WholeLife,
            S::Active,
            1_000_000_000.0,
            2_500_000.0,
            F::Monthly,
            date(2023, 3, 1),
            None,
        ),
        (
            "POL-2023-0002",
            1,
            1,
            T::TermLife,
            S::Active,
            500_000_000.0,
            4_800_000.0,
            F::Quarterly,
            date(2023, 4, 15),
            Some(date(2043, 4, 15)),
        ),
        (
            "POL-2023-0003",
            2,
            0,
            T::Endowment,
            S::Lapsed,
            300_000_000.0,
            18_000_000.0,
            F::Annual,
            date(2023, 6, 1),
            Some(date(2038, 6, 1)),
        ),
        (
            "POL-2023-0004",
            3,
            2,
            T::Health,
            S::Active,
            200_000_000.0,
            900_000.0,
            F::Monthly,
            date(2023, 8, 20),
            Some(date(2024, 8, 20)),
        ),
        (
            "POL-2024-0005",
            4,
            1,
            T::Accident,
            S::Cancelled,
            150_000_000.0,
            3_000_000.0,
            F::SemiAnnual,
            date(2024, 1, 10),
            Some(date(2025, 1, 10)),
        ),
        (
            "POL-2024-0006",
            5,
            3,
            T::TermLife,
            S::Pending,
            800_000_000.0,
            6_200_000.0,
            F::Quarterly,
            date(2024, 5, 1),
            Some(date(2044, 5, 1)),
        ),
        (
            "POL-2024-0007",
            0,
            1,
            T::Health,
            S::Active,
            250_000_000.0,
            1_100_000.0,
            F::Monthly,
            date(2024, 2, 1),
            Some(date(2025, 2, 1)),
        ),
        (
            "POL-2022-0008",
            1,
            0,
            T::Endowment,
            S::Expired,
            100_000_000.0,
            9_500_000.0,
            F::Annual,
            date(2012, 1, 1),
            Some(date(2022, 1, 1)),
        ),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let (number, person, agent, kind, status, coverage, premium, frequency, start, end) =
                row;
            Policy {
                id: policy_id(i as u128),
                policy_number: number.to_string(),
                insured_person_id: insured_person_id(person),
                agent_id: agent_id(agent),
                policy_type: kind,
                status,
                coverage_amount: coverage,
                premium_amount: premium,
                premium_frequency: frequency,
                start_date: start,
                end_date: end,
                notes: None,
                created_at: at(2023, 3, 1 + i as u32),
                updated_at: at(2023, 3, 1 + i as u32),
            }
        })
        .collect()
}

fn beneficiaries() -> Vec<Beneficiary> {
    use Relationship as R;
    // Policy 2 deliberately sums to 80% to exercise the allocation report.
    let rows = [
        (0, "Nguyen Thi Hanh", R::Spouse, Some("079087004321"), 60.0, Some("0912000111")),
        (0, "Nguyen Minh Khoa", R::Child, None, 40.0, None),
        (1, "Tran Van Long", R::Spouse, Some("001188002468"), 100.0, Some("0987000222")),
        (2, "Le Thi Mai", R::Parent, Some("048050001357"), 50.0, None),
        (2, "Le Hoang Nam", R::Sibling, None, 30.0, None),
        (3, "Pham Van Phuc", R::Parent, Some("092070008642"), 100.0, Some("0933000333")),
        (5, "Dang Van Quang", R::Parent, None, 50.0, None),
        (5, "Dang Thi Rang", R::Parent, None, 50.0, None),
        (6, "Nguyen Thi Hanh", R::Spouse, Some("079087004321"), 100.0, Some("0912000111")),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (policy, name, relationship, identity, percentage, phone))| Beneficiary {
            id: beneficiary_id(i as u128),
            policy_id: policy_id(policy),
            full_name: name.to_string(),
            relationship,
            identity_number: identity.map(str::to_string),
            percentage,
            phone: phone.map(str::to_string),
            created_at: at(2023, 4, 1 + i as u32),
            updated_at: at(2023, 4, 1 + i as u32),
        })
        .collect()
}

fn premium_payments() -> Vec<PremiumPayment> {
    use PaymentMethod as M;
    use PaymentStatus as S;
    let rows = [
        (
            0,
            2_500_000.0,
            date(2024, 1, 1),
            Some(date(2023, 12, 28)),
            M::BankTransfer,
            S::Paid,
            Some("TXN-240101-001"),
        ),
        (
            0,
            2_500_000.0,
            date(2024, 2, 1),
            Some(date(2024, 2, 1)),
            M::BankTransfer,
            S::Paid,
            Some("TXN-240201-001"),
        ),
        (
            0,
            2_500_000.0,
            date(2024, 3, 1),
            Some(date(2024, 3, 3)),
            M::CreditCard,
            S::Paid,
            Some("TXN-240303-002"),
        ),
        (0, 2_500_000.0, date(2024, 4, 1), None, M::BankTransfer, S::Overdue, None),
        (
            1,
            4_800_000.0,
            date(2024, 1, 15),
            Some(date(2024, 1, 14)),
            M::Cash,
            S::Paid,
            Some("RCPT-0001"),
        ),
        (
            1,
            4_800_000.0,
            date(2024, 4, 15),
            Some(date(2024, 4, 15)),
            M::Cash,
            S::Paid,
            Some("RCPT-0002"),
        ),
        (1, 4_800_000.0, date(2024, 7, 15), None, M::Cash, S::Pending, None),
        (2, 18_000_000.0, date(2024, 6, 1), None, M::Check, S::Overdue, None),
        (
            3,
            900_000.0,
            date(2024, 2, 20),
            Some(date(2024, 2, 19)),
            M::CreditCard,
            S::Paid,
            Some("TXN-240219-007"),
        ),
        (3, 900_000.0, date(2024, 3, 20), None, M::CreditCard, S::Failed, Some("TXN-240320-008")),
        (
            4,
            3_000_000.0,
            date(2024, 1, 10),
            Some(date(2024, 1, 10)),
            M::BankTransfer,
            S::Refunded,
            Some("TXN-240110-003"),
        ),
        (
            6,
            1_100_000.0,
            date(2024, 2, 1),
            Some(date(2024, 2, 2)),
            M::BankTransfer,
            S::Paid,
            Some("TXN-240202-010"),
        ),
        (
            6,
            1_100_000.0,
            date(2024, 3, 1),
            Some(date(2024, 3, 1)),
            M::BankTransfer,
            S::Paid,
            Some("TXN-240301-011"),
        ),
        (6, 1_100_000.0, date(2024, 4, 1), None, M::BankTransfer, S::Pending, None),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (policy, amount, due, paid, method, status, reference))| PremiumPayment {
            id: payment_id(i as u128),
            policy_id: policy_id(policy),
            amount,
            due_date: due,
            paid_date: paid,
            payment_method: method,
            status,
            reference_number: reference.map(str::to_string),
            created_at: at(2023, 12, 1 + i as u32),
            updated_at: at(2023, 12, 1 + i as u32),
        })
        .collect()
}

fn users() -> Vec<User> {
    let rows = [
        (
            "admin",
            "System Administrator",
            "admin@baohiem.vn",
            UserRole::Admin,
            UserStatus::Active,
            Some(at(2024, 6, 1)),
        ),
        (
            "lan.nguyen",
            "Nguyen Thi Lan",
            "lan.nguyen@baohiem.vn",
            UserRole::Manager,
            UserStatus::Active,
            Some(at(2024, 5, 28)),
        ),
        (
            "tuan.pham",
            "Pham Minh Tuan",
            "tuan.pham@baohiem.vn",
            UserRole::Agent,
            UserStatus::Active,
            None,
        ),
        (
            "auditor",
            "External Auditor",
            "audit@baohiem.vn",
            UserRole::Viewer,
            UserStatus::Inactive,
            None,
        ),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (username, name, email, role, status, last_login))| User {
            id: user_id(i as u128),
            username: username.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            last_login_at: last_login,
            created_at: at(2023, 1, 1 + i as u32),
            updated_at: at(2023, 1, 1 + i as u32),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;

    #[test]
    fn test_seed_records_pass_validation() {
        let data = demo_data();
        let today = date(2024, 6, 15);
        for r in &data.agents {
            r.validate(today).unwrap();
        }
        for r in &data.insured_persons {
            r.validate(today).unwrap();
        }
        for r in &data.policies {
            r.validate(today).unwrap();
        }
        for r in &data.beneficiaries {
            r.validate(today).unwrap();
        }
        for r in &data.premium_payments {
            r.validate(today).unwrap();
        }
        for r in &data.users {
            r.validate(today).unwrap();
        }
    }

    #[test]
    fn test_seed_links_resolve() {
        let data = demo_data();
        for policy in &data.policies {
            assert!(data.agents.iter().any(|a| a.id == policy.agent_id));
            assert!(data.insured_persons.iter().any(|p| p.id == policy.insured_person_id));
        }
        for payment in &data.premium_payments {
            assert!(data.policies.iter().any(|p| p.id == payment.policy_id));
        }
        for b in &data.beneficiaries {
            assert!(data.policies.iter().any(|p| p.id == b.policy_id));
        }
    }
}
