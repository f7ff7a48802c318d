//! Query normalisation and offset pagination shared by every list endpoint.
//!
//! A raw [`ListQuery`] is normalised into a [`QueryDescriptor`]; a module then
//! combines the descriptor with its searchable fields and fixed filters into a
//! [`PageQuery`]. The resulting [`Filter`] is plain data: repositories render it
//! to SQL, and [`Filter::matches`] evaluates it in memory.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

pub const DEFAULT_TAKE: u64 = 10;
pub const MAX_TAKE: u64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid date `{value}` for `{param}`")]
    InvalidDate { param: &'static str, value: String },
    #[error("unknown field `{field}`")]
    UnknownField { field: String },
}

/// List parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub interval_name: Option<String>,
    pub sort: Option<String>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

impl ListQuery {
    pub fn normalize(self) -> Result<QueryDescriptor, PaginationError> {
        let search = self
            .search
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_bound("from", raw))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_bound("to", raw))
            .transpose()?;
        let interval_field = self
            .interval_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(QueryDescriptor {
            search,
            from,
            to,
            interval_field,
            sort: SortSpec::parse(self.sort.as_deref()),
            skip: clamp_skip(self.skip),
            take: clamp_take(self.take),
        })
    }
}

/// Normalised list request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub search: Option<String>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub interval_field: Option<String>,
    pub sort: SortSpec,
    pub skip: u64,
    pub take: u64,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            search: None,
            from: None,
            to: None,
            interval_field: None,
            sort: SortSpec::default(),
            skip: 0,
            take: DEFAULT_TAKE,
        }
    }
}

impl QueryDescriptor {
    /// The interval clause, present only when the field and both bounds are set.
    pub fn interval(&self) -> Option<Condition> {
        match (&self.interval_field, self.from, self.to) {
            (Some(field), Some(from), Some(to)) => Some(Condition::Between {
                field: field.clone(),
                from,
                to,
            }),
            _ => None,
        }
    }

    /// Reject sort fields and date-interval fields the module does not expose.
    pub fn ensure_fields(
        &self,
        sort_fields: &[&str],
        interval_fields: &[&str],
    ) -> Result<(), PaginationError> {
        if !sort_fields.contains(&self.sort.field.as_str()) {
            return Err(PaginationError::UnknownField {
                field: self.sort.field.clone(),
            });
        }
        if let Some(field) = self.interval_field.as_deref().filter(|_| self.interval().is_some()) {
            if !interval_fields.contains(&field) {
                return Err(PaginationError::UnknownField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Timestamp columns every module can filter by interval.
pub const TIMESTAMP_FIELDS: &[&str] = &["createdAt", "updatedAt"];

fn clamp_take(take: Option<i64>) -> u64 {
    match take {
        None | Some(0) => DEFAULT_TAKE,
        Some(value) => value.clamp(1, MAX_TAKE as i64) as u64,
    }
}

fn clamp_skip(skip: Option<i64>) -> u64 {
    skip.filter(|value| *value > 0).map_or(0, |value| value as u64)
}

fn parse_bound(param: &'static str, raw: &str) -> Result<OffsetDateTime, PaginationError> {
    parse_timestamp(raw).ok_or_else(|| PaginationError::InvalidDate {
        param,
        value: raw.to_string(),
    })
}

/// Accept RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Parse `field:direction`. Anything but a case-insensitive `asc` sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let (field, direction) = match raw.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.trim()),
            None => (raw.trim(), ""),
        };
        let field = if field.is_empty() {
            DEFAULT_SORT_FIELD
        } else {
            field
        };
        let direction = if direction.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        Self {
            field: field.to_string(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Int(i64),
    Float(f64),
    Timestamp(OffsetDateTime),
}

impl FilterValue {
    fn compare(&self, other: &FilterValue) -> Ordering {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b)) => a.cmp(b),
            (FilterValue::Uuid(a), FilterValue::Uuid(b)) => a.cmp(b),
            (FilterValue::Int(a), FilterValue::Int(b)) => a.cmp(b),
            (FilterValue::Float(a), FilterValue::Float(b)) => a.total_cmp(b),
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(i64::from(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<OffsetDateTime> for FilterValue {
    fn from(value: OffsetDateTime) -> Self {
        FilterValue::Timestamp(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq {
        field: String,
        value: FilterValue,
    },
    ContainsInsensitive {
        field: String,
        term: String,
    },
    Between {
        field: String,
        from: OffsetDateTime,
        to: OffsetDateTime,
    },
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Condition::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Condition::ContainsInsensitive {
            field: field.into(),
            term: term.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Condition::Eq { field, .. }
            | Condition::ContainsInsensitive { field, .. }
            | Condition::Between { field, .. } => field,
        }
    }

    fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        let values = record.field_values(self.field());
        match self {
            Condition::Eq { value, .. } => values.iter().any(|candidate| candidate == value),
            Condition::ContainsInsensitive { term, .. } => {
                let needle = term.to_lowercase();
                values.iter().any(|candidate| match candidate {
                    FilterValue::Text(text) => text.to_lowercase().contains(&needle),
                    _ => false,
                })
            }
            Condition::Between { from, to, .. } => values.iter().any(|candidate| match candidate {
                FilterValue::Timestamp(at) => at >= from && at <= to,
                _ => false,
            }),
        }
    }
}

/// Conjunction of conditions. An empty branch matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereBranch {
    pub conditions: Vec<Condition>,
}

impl WhereBranch {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    fn with(mut self, extra: &[Condition]) -> Self {
        self.conditions.extend_from_slice(extra);
        self
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }
}

/// Disjunction of branches; always holds at least one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    branches: Vec<WhereBranch>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            branches: vec![WhereBranch::default()],
        }
    }
}

impl Filter {
    pub fn branches(&self) -> &[WhereBranch] {
        &self.branches
    }

    /// True when the filter accepts every record.
    pub fn is_unrestricted(&self) -> bool {
        self.branches.iter().any(|branch| branch.conditions.is_empty())
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.branches.iter().any(|branch| branch.matches(record))
    }
}

/// Equality filters with absent or empty values dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedFilters {
    entries: Vec<(String, FilterValue)>,
}

impl FixedFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<FilterValue>>(mut self, field: &str, value: Option<V>) -> Self {
        let Some(value) = value.map(Into::into) else {
            return self;
        };
        if matches!(&value, FilterValue::Text(text) if text.trim().is_empty()) {
            return self;
        }
        self.entries.push((field.to_string(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn conditions(&self) -> impl Iterator<Item = Condition> + '_ {
        self.entries
            .iter()
            .map(|(field, value)| Condition::eq(field.clone(), value.clone()))
    }
}

/// Combine search, fixed filters and interval into a filter.
///
/// Each search clause and each `extra_or` branch becomes its own branch, and
/// every branch is conjoined with the fixed filters, the interval clause and
/// `scope`. Without any OR branch the filter is the single AND branch.
pub fn build_filter(
    search_fields: &[&str],
    descriptor: &QueryDescriptor,
    fixed: &FixedFilters,
    extra_or: Vec<WhereBranch>,
    scope: &[Condition],
) -> Filter {
    let mut and_group: Vec<Condition> = fixed.conditions().collect();
    and_group.extend(descriptor.interval());
    and_group.extend_from_slice(scope);

    let mut or_branches = extra_or;
    if let Some(term) = descriptor.search.as_deref() {
        or_branches.extend(
            search_fields
                .iter()
                .map(|field| WhereBranch::new(vec![Condition::contains(*field, term)])),
        );
    }

    if or_branches.is_empty() {
        return Filter {
            branches: vec![WhereBranch::new(and_group)],
        };
    }

    Filter {
        branches: or_branches
            .into_iter()
            .map(|branch| branch.with(&and_group))
            .collect(),
    }
}

/// Filter, ordering and slice handed to a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub filter: Filter,
    pub sort: SortSpec,
    pub skip: u64,
    pub take: u64,
}

impl PageQuery {
    pub fn new(
        search_fields: &[&str],
        descriptor: &QueryDescriptor,
        fixed: &FixedFilters,
    ) -> Self {
        Self::with_options(search_fields, descriptor, fixed, Vec::new(), &[])
    }

    pub fn with_options(
        search_fields: &[&str],
        descriptor: &QueryDescriptor,
        fixed: &FixedFilters,
        extra_or: Vec<WhereBranch>,
        scope: &[Condition],
    ) -> Self {
        Self {
            filter: build_filter(search_fields, descriptor, fixed, extra_or, scope),
            sort: descriptor.sort.clone(),
            skip: descriptor.skip,
            take: descriptor.take,
        }
    }

    /// Every record matching `scope`, in default order.
    pub fn all(scope: &[Condition]) -> Self {
        Self {
            filter: Filter {
                branches: vec![WhereBranch::new(scope.to_vec())],
            },
            sort: SortSpec::default(),
            skip: 0,
            take: u64::MAX,
        }
    }
}

/// Records exposing named field values to in-memory filtering.
///
/// A field backed by a related collection returns one value per element.
pub trait Filterable {
    fn field_values(&self, field: &str) -> Vec<FilterValue>;
}

/// A slice of matching records plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, count: u64) -> Self {
        Self { data, count }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

/// Evaluate a page query against records held in memory.
pub fn paginate_records<T>(records: impl IntoIterator<Item = T>, query: &PageQuery) -> Page<T>
where
    T: Filterable,
{
    let mut matching: Vec<T> = records
        .into_iter()
        .filter(|record| query.filter.matches(record))
        .collect();
    let count = matching.len() as u64;

    matching.sort_by(|a, b| {
        let left = a.field_values(&query.sort.field);
        let right = b.field_values(&query.sort.field);
        let ordering = match (left.first(), right.first()) {
            (Some(a), Some(b)) => a.compare(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        match query.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
    let take = usize::try_from(query.take).unwrap_or(usize::MAX);
    let data = matching.into_iter().skip(skip).take(take).collect();
    Page::new(data, count)
}
