//! Compilation of a declarative filter file into one composite predicate over
//! a [`GroupRecord`]. Bad clauses are configuration errors and fail the whole
//! compilation up front; at match time a clause over a field the record never
//! produced simply evaluates to false.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::error::FilterError;
use crate::records::GroupRecord;

/// The day the platform went live; default lower bound for creation-date
/// clauses.
static PLATFORM_LAUNCH: LazyLock<NaiveDate> =
    LazyLock::new(|| NaiveDate::from_ymd_opt(2004, 2, 4).unwrap());

/// Default member-count ceiling, comfortably above the largest real group.
const MEMBERS_CEILING: f64 = 3e9;

/// One clause of the user-supplied filter JSON. `info_key` selects the target
/// field; the remaining keys are operator parameters and which of them apply
/// depends on the field.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterClause {
    pub info_key: String,
    #[serde(default)]
    pub min_val: Option<serde_json::Value>,
    #[serde(default)]
    pub max_val: Option<serde_json::Value>,
    #[serde(default)]
    pub relevant_locations: Option<Vec<String>>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub should_include: Option<bool>,
}

/// Closed set of filterable fields; anything else in `info_key` is rejected
/// at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Locations,
    Members,
    CreationDate,
    Description,
}

impl Field {
    fn from_key(key: &str) -> Result<Self, FilterError> {
        match key {
            "locations" => Ok(Field::Locations),
            "n_members" => Ok(Field::Members),
            "creation_date" => Ok(Field::CreationDate),
            "description" => Ok(Field::Description),
            other => Err(FilterError::UnsupportedFilterField(other.to_string())),
        }
    }
}

type Predicate = Box<dyn Fn(&GroupRecord) -> bool + Send + Sync>;

/// A compiled filter: the conjunction of all clause predicates, always
/// starting with "the group is public".
pub struct GroupFilter {
    predicates: Vec<Predicate>,
}

impl GroupFilter {
    pub fn matches(&self, record: &GroupRecord) -> bool {
        self.predicates.iter().all(|p| p(record))
    }
}

/// Compile the clause list. An empty list yields the public-only filter.
pub fn compile(clauses: &[FilterClause]) -> Result<GroupFilter, FilterError> {
    let mut predicates: Vec<Predicate> = vec![Box::new(|r: &GroupRecord| !r.is_private)];
    for clause in clauses {
        predicates.push(compile_clause(clause)?);
    }
    Ok(GroupFilter { predicates })
}

fn compile_clause(clause: &FilterClause) -> Result<Predicate, FilterError> {
    match Field::from_key(&clause.info_key)? {
        Field::Locations => {
            let relevant = clause.relevant_locations.clone().unwrap_or_default();
            let strict = clause.strict.unwrap_or(false);
            Ok(Box::new(move |r| match &r.locations {
                Some(locations) if !locations.is_empty() => locations
                    .iter()
                    .any(|l| relevant.contains(l))
                    || !strict,
                _ => !strict,
            }))
        }
        Field::Members => {
            let min = number_bound(&clause.min_val)?.unwrap_or(0.0);
            let max = number_bound(&clause.max_val)?.unwrap_or(MEMBERS_CEILING);
            Ok(Box::new(move |r| match r.members {
                Some(m) => min < m as f64 && (m as f64) < max,
                None => false,
            }))
        }
        Field::CreationDate => {
            let min = date_bound(&clause.min_val)?.unwrap_or(*PLATFORM_LAUNCH);
            let max = date_bound(&clause.max_val)?.unwrap_or_else(|| Local::now().date_naive());
            Ok(Box::new(move |r| match r.creation_date {
                Some(d) => min < d && d < max,
                None => false,
            }))
        }
        Field::Description => {
            let needle = clause
                .value
                .clone()
                .ok_or(FilterError::MissingFilterValue)?;
            let should_include = clause.should_include.unwrap_or(true);
            Ok(Box::new(move |r| {
                let description = r.description.as_deref().unwrap_or("");
                description.contains(&needle) == should_include
            }))
        }
    }
}

fn number_bound(value: &Option<serde_json::Value>) -> Result<Option<f64>, FilterError> {
    match value {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| FilterError::BadNumberBound(v.to_string())),
    }
}

fn date_bound(value: &Option<serde_json::Value>) -> Result<Option<NaiveDate>, FilterError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let s = v.as_str().unwrap_or_default();
            iso_date(s)
                .map(Some)
                .ok_or_else(|| FilterError::BadDateBound(s.to_string()))
        }
    }
}

fn iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ── Tests ──
