//! Search, filter and sort over an in-memory collection.
//!
//! Every list endpoint runs the same pipeline on the full collection:
//! search → categorical/reference/range filters → single-key sort → paginate.
//! Each entity supplies its own whitelist of searchable fields and a sort-key
//! enum that maps onto a typed [`SortValue`], so no field is looked up by name.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::{paginate, Page};

/// Sentinel meaning "no filter" for categorical parameters.
pub const ALL_SENTINEL: &str = "ALL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub order: SortOrder,
}

/// A typed value to order records by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Missing,
}

impl<'a> From<Option<&'a str>> for SortValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(SortValue::Missing, SortValue::Text)
    }
}

impl From<Option<NaiveDate>> for SortValue<'_> {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(SortValue::Missing, SortValue::Date)
    }
}

impl From<Option<DateTime<Utc>>> for SortValue<'_> {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(SortValue::Missing, SortValue::Timestamp)
    }
}

/// Case-folded comparison with a raw tiebreak so the order stays total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Mismatched or missing values compare equal, which leaves them in place
/// under a stable sort.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
        (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Normalised filter state. `None` everywhere means "match everything".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilters {
    /// Lower-cased search needle.
    pub search: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub payment_method: Option<String>,
    pub relationship: Option<String>,
    pub role: Option<String>,
    pub gender: Option<String>,
    pub policy_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub insured_person_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

/// Implemented by every record that can be listed.
pub trait Listable {
    type SortKey: FromStr + Copy;

    /// Whitelisted text fields the search box looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// Categorical and reference filters specific to this entity.
    fn matches_filters(&self, filters: &ListFilters) -> bool;

    fn sort_value(&self, key: Self::SortKey) -> SortValue<'_>;

    /// Date the `fromDate`/`toDate` range applies to.
    fn primary_date(&self) -> Option<NaiveDate> {
        None
    }

    /// Amount the `minAmount`/`maxAmount` range applies to.
    fn primary_amount(&self) -> Option<f64> {
        None
    }
}

/// True when the filter is absent or equals `label` ignoring case.
pub fn category_matches(filter: Option<&str>, label: &str) -> bool {
    filter.map_or(true, |wanted| wanted.eq_ignore_ascii_case(label))
}

pub fn reference_matches(filter: Option<Uuid>, id: Uuid) -> bool {
    filter.map_or(true, |wanted| wanted == id)
}

fn search_matches<T: Listable>(item: &T, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle)),
    }
}

fn range_matches<T: Listable>(item: &T, filters: &ListFilters) -> bool {
    if filters.from_date.is_some() || filters.to_date.is_some() {
        if let Some(date) = item.primary_date() {
            if filters.from_date.is_some_and(|from| date < from)
                || filters.to_date.is_some_and(|to| date > to)
            {
                return false;
            }
        }
    }
    if filters.min_amount.is_some() || filters.max_amount.is_some() {
        if let Some(amount) = item.primary_amount() {
            if filters.min_amount.is_some_and(|min| amount < min)
                || filters.max_amount.is_some_and(|max| amount > max)
            {
                return false;
            }
        }
    }
    true
}

pub fn apply_filters<T: Listable>(items: Vec<T>, filters: &ListFilters) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            search_matches(item, filters.search.as_deref())
                && item.matches_filters(filters)
                && range_matches(item, filters)
        })
        .collect()
}

/// Stable single-key sort. An unknown key leaves the order untouched.
pub fn apply_sort<T: Listable>(items: &mut [T], sort: &SortSpec) {
    let Ok(key) = sort.key.parse::<T::SortKey>() else {
        return;
    };
    items.sort_by(|a, b| {
        let ordering = compare_values(&a.sort_value(key), &b.sort_value(key));
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// A fully parsed list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub page: i64,
    pub limit: usize,
    pub filters: ListFilters,
    pub sort: Option<SortSpec>,
}

pub fn run_query<T: Listable + Clone>(items: Vec<T>, request: &ListRequest) -> Page<T> {
    let mut filtered = apply_filters(items, &request.filters);
    if let Some(sort) = &request.sort {
        apply_sort(&mut filtered, sort);
    }
    paginate(&filtered, request.page, request.limit)
}

/// Page size bounds taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageDefaults {
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Raw query string of a list endpoint. Everything is a string so that
/// malformed paging input degrades to defaults instead of a rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub payment_method: Option<String>,
    pub relationship: Option<String>,
    pub role: Option<String>,
    pub gender: Option<String>,
    pub policy_id: Option<String>,
    pub agent_id: Option<String>,
    pub insured_person_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn category(raw: Option<&str>) -> Option<String> {
    non_blank(raw)
        .filter(|s| !s.eq_ignore_ascii_case(ALL_SENTINEL))
        .map(str::to_string)
}

/// Parses an optional typed parameter. Blank means absent; garbage is a 400.
fn typed<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    non_blank(raw)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| AppError::Validation(format!("Invalid value '{s}' for '{name}'")))
        })
        .transpose()
}

impl ListQuery {
    pub fn parse(&self, defaults: PageDefaults) -> Result<ListRequest, AppError> {
        let page = non_blank(self.page.as_deref())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(1);
        let max_limit = defaults.max_limit.max(1);
        let limit = non_blank(self.limit.as_deref())
            .and_then(|s| s.parse::<i64>().ok())
            .map(|n| usize::try_from(n.max(1)).unwrap_or(max_limit).min(max_limit))
            .unwrap_or(defaults.default_limit)
            .clamp(1, max_limit);

        let filters = ListFilters {
            search: non_blank(self.search.as_deref()).map(str::to_lowercase),
            status: category(self.status.as_deref()),
            kind: category(self.kind.as_deref()),
            payment_method: category(self.payment_method.as_deref()),
            relationship: category(self.relationship.as_deref()),
            role: category(self.role.as_deref()),
            gender: category(self.gender.as_deref()),
            policy_id: typed("policyId", self.policy_id.as_deref())?,
            agent_id: typed("agentId", self.agent_id.as_deref())?,
            insured_person_id: typed("insuredPersonId", self.insured_person_id.as_deref())?,
            from_date: typed("fromDate", self.from_date.as_deref())?,
            to_date: typed("toDate", self.to_date.as_deref())?,
            min_amount: typed("minAmount", self.min_amount.as_deref())?,
            max_amount: typed("maxAmount", self.max_amount.as_deref())?,
        };

        let sort = non_blank(self.sort_by.as_deref()).map(|key| SortSpec {
            key: key.to_string(),
            order: SortOrder::parse(self.sort_order.as_deref()),
        });

        Ok(ListRequest {
            page,
            limit,
            filters,
            sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        email: &'static str,
        status: &'static str,
        amount: f64,
        due: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, Copy)]
    enum RowKey {
        Name,
        Amount,
        Due,
    }

    impl FromStr for RowKey {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "name" => Ok(RowKey::Name),
                "amount" => Ok(RowKey::Amount),
                "due" => Ok(RowKey::Due),
                _ => Err(()),
            }
        }
    }

    impl Listable for Row {
        type SortKey = RowKey;

        fn search_fields(&self) -> Vec<&str> {
            vec![self.name, self.email]
        }

        fn matches_filters(&self, filters: &ListFilters) -> bool {
            category_matches(filters.status.as_deref(), self.status)
        }

        fn sort_value(&self, key: RowKey) -> SortValue<'_> {
            match key {
                RowKey::Name => SortValue::Text(self.name),
                RowKey::Amount => SortValue::Number(self.amount),
                RowKey::Due => self.due.into(),
            }
        }

        fn primary_date(&self) -> Option<NaiveDate> {
            self.due
        }

        fn primary_amount(&self) -> Option<f64> {
            Some(self.amount)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "Charlie",
                email: "c@x.vn",
                status: "ACTIVE",
                amount: 300.0,
                due: Some(date(2024, 3, 1)),
            },
            Row {
                name: "alice",
                email: "a@y.vn",
                status: "INACTIVE",
                amount: 100.0,
                due: None,
            },
            Row {
                name: "Bob",
                email: "bob@x.vn",
                status: "ACTIVE",
                amount: 200.0,
                due: Some(date(2024, 1, 15)),
            },
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    fn defaults() -> PageDefaults {
        PageDefaults {
            default_limit: 10,
            max_limit: 100,
        }
    }

    fn sort_by(key: &str, order: SortOrder) -> SortSpec {
        SortSpec {
            key: key.to_string(),
            order,
        }
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let filters = ListFilters {
            search: Some("x.vn".into()),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(rows(), &filters)), vec!["Charlie", "Bob"]);

        let filters = ListFilters {
            search: Some("ali".into()),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(rows(), &filters)), vec!["alice"]);
    }

    #[test]
    fn test_all_sentinel_and_blank_disable_filter() {
        for raw in ["ALL", "all", "", "   "] {
            let query = ListQuery {
                status: Some(raw.into()),
                search: Some(" ".into()),
                ..Default::default()
            };
            let request = query.parse(defaults()).unwrap();
            assert_eq!(request.filters, ListFilters::default());
            assert_eq!(apply_filters(rows(), &request.filters).len(), 3);
        }
    }

    #[test]
    fn test_status_filter_ignores_case() {
        let filters = ListFilters {
            status: Some("active".into()),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(rows(), &filters)), vec!["Charlie", "Bob"]);
    }

    #[test]
    fn test_amount_range_is_inclusive() {
        let filters = ListFilters {
            min_amount: Some(100.0),
            max_amount: Some(200.0),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(rows(), &filters)), vec!["alice", "Bob"]);
    }

    #[test]
    fn test_date_range_skips_records_without_date() {
        let filters = ListFilters {
            from_date: Some(date(2024, 1, 15)),
            to_date: Some(date(2024, 2, 1)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(rows(), &filters)), vec!["alice", "Bob"]);
    }

    #[test]
    fn test_text_sort_is_case_folded() {
        let mut items = rows();
        apply_sort(&mut items, &sort_by("name", SortOrder::Asc));
        assert_eq!(names(&items), vec!["alice", "Bob", "Charlie"]);
    }

    #[test]
    fn test_desc_reverses_asc() {
        let mut asc = rows();
        apply_sort(&mut asc, &sort_by("amount", SortOrder::Asc));
        let mut desc = rows();
        apply_sort(&mut desc, &sort_by("amount", SortOrder::Desc));
        let mut reversed = names(&asc);
        reversed.reverse();
        assert_eq!(names(&desc), reversed);
    }

    #[test]
    fn test_unknown_sort_key_keeps_order() {
        let mut items = rows();
        apply_sort(&mut items, &sort_by("shoeSize", SortOrder::Desc));
        assert_eq!(items, rows());
    }

    #[test]
    fn test_missing_values_compare_equal() {
        let one = SortValue::Number(1.0);
        assert_eq!(compare_values(&SortValue::Missing, &one), Ordering::Equal);
        assert_eq!(compare_values(&SortValue::Text("a"), &one), Ordering::Equal);
        assert_eq!(
            compare_values(&SortValue::Number(f64::NAN), &one),
            Ordering::Equal
        );
    }

    #[test]
    fn test_parse_is_lenient_on_paging() {
        let query = ListQuery {
            page: Some("abc".into()),
            limit: Some("-4".into()),
            ..Default::default()
        };
        let request = query.parse(defaults()).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);

        let query = ListQuery {
            limit: Some("5000".into()),
            ..Default::default()
        };
        assert_eq!(query.parse(defaults()).unwrap().limit, 100);

        let query = ListQuery::default();
        assert_eq!(query.parse(defaults()).unwrap().limit, 10);
    }

    #[test]
    fn test_parse_rejects_malformed_typed_filter() {
        let query = ListQuery {
            policy_id: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(matches!(query.parse(defaults()), Err(AppError::Validation(_))));

        let query = ListQuery {
            from_date: Some("2024-02-30".into()),
            ..Default::default()
        };
        assert!(query.parse(defaults()).is_err());
    }

    #[test]
    fn test_sort_order_defaults_to_asc() {
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Asc);
    }

    #[test]
    fn test_run_query_paginates_filtered_result() {
        let request = ListRequest {
            page: 2,
            limit: 1,
            filters: ListFilters {
                status: Some("ACTIVE".into()),
                ..Default::default()
            },
            sort: Some(sort_by("name", SortOrder::Asc)),
        };
        let page = run_query(rows(), &request);
        assert_eq!(page.total_items, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(names(&page.visible_items), vec!["Charlie"]);
    }
}
