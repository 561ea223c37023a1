use std::fmt;

use indexmap::IndexSet;
use itertools::Itertools;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::*;
use crate::utilities::privacy;
use crate::{Float, Integer};

/// One building/project entry in the synthetic portfolio.
///
/// Rows are identifier-free: location, two categorical attributes, and the
/// numeric outcome fields a query may aggregate over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub lat: Float,
    pub lng: Float,
    pub ecm: String,
    pub building_type: String,
    pub year_built: Float,
    pub savings: Float,
    pub eui: Float,
    pub cvrmse: Float,
    pub nmbe: Float,
}

/// A categorical column of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    BuildingType,
    Ecm,
}

impl CategoricalField {
    pub fn of(self, record: &Record) -> &str {
        match self {
            CategoricalField::BuildingType => &record.building_type,
            CategoricalField::Ecm => &record.ecm,
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(match self {
            CategoricalField::BuildingType => "building_type",
            CategoricalField::Ecm => "ecm",
        })
    }
}

/// A numeric column of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Lat,
    Lng,
    YearBuilt,
    Savings,
    Eui,
    Cvrmse,
    Nmbe,
}

impl NumericField {
    pub fn of(self, record: &Record) -> Float {
        match self {
            NumericField::Lat => record.lat,
            NumericField::Lng => record.lng,
            NumericField::YearBuilt => record.year_built,
            NumericField::Savings => record.savings,
            NumericField::Eui => record.eui,
            NumericField::Cvrmse => record.cvrmse,
            NumericField::Nmbe => record.nmbe,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(match self {
            NumericField::Lat => "lat",
            NumericField::Lng => "lng",
            NumericField::YearBuilt => "year_built",
            NumericField::Savings => "savings",
            NumericField::Eui => "eui",
            NumericField::Cvrmse => "cvrmse",
            NumericField::Nmbe => "nmbe",
        })
    }
}

/// One term of a query filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match on a categorical column.
    Equals { field: CategoricalField, value: String },
    /// Set membership on a categorical column.
    OneOf { field: CategoricalField, values: Vec<String> },
    /// Inclusive range over a numeric column.
    Between { field: NumericField, lower: Float, upper: Float },
}

impl Predicate {
    pub fn equals<V: Into<String>>(field: CategoricalField, value: V) -> Predicate {
        Predicate::Equals { field, value: value.into() }
    }

    pub fn one_of<V: Into<String>>(field: CategoricalField, values: Vec<V>) -> Predicate {
        Predicate::OneOf {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between(field: NumericField, lower: Float, upper: Float) -> Predicate {
        Predicate::Between { field, lower, upper }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Equals { field, value } => field.of(record) == value,
            Predicate::OneOf { field, values } =>
                values.iter().any(|member| member == field.of(record)),
            Predicate::Between { field, lower, upper } => {
                let value = field.of(record);
                *lower <= value && value <= *upper
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Predicate::Equals { field, value } =>
                write!(formatter, "{} = {:?}", field, value),
            Predicate::OneOf { field, values } =>
                write!(formatter, "{} in {{{}}}", field, values.iter().join(", ")),
            Predicate::Between { field, lower, upper } =>
                write!(formatter, "{} in [{}, {}]", field, lower, upper),
        }
    }
}

/// A conjunction of zero or more predicates. The empty conjunction matches
/// every record, which is how the UI's "All Buildings"/"All ECMS" wildcard
/// selections are modeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    terms: Vec<Predicate>,
}

impl QueryFilter {
    /// The filter that matches every record.
    pub fn all() -> QueryFilter {
        QueryFilter::default()
    }

    pub fn new(terms: Vec<Predicate>) -> QueryFilter {
        QueryFilter { terms }
    }

    /// Extend the conjunction by one term.
    pub fn and(mut self, term: Predicate) -> QueryFilter {
        self.terms.push(term);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.terms.iter().all(|term| term.matches(record))
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return formatter.write_str("all records");
        }
        formatter.write_str(&self.terms.iter().join(" and "))
    }
}

/// An ordered, immutable collection of records, loaded once at startup and
/// shared read-only for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Dataset {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Extract an output column over the given row indices.
    ///
    /// Indices must be in range for this dataset, as produced by applying a
    /// filter to it; an out-of-range index is a caller bug and panics.
    pub fn column(&self, indices: &[usize], field: OutputField) -> Array1<Float> {
        debug_assert!(indices.iter().all(|&index| index < self.records.len()));
        Array1::from(indices.iter()
            .map(|&index| field.of(&self.records[index]))
            .collect::<Vec<Float>>())
    }

    /// Distinct values of a categorical column, in first-appearance order.
    /// Intended for populating UI selectors.
    pub fn categories(&self, field: CategoricalField) -> Vec<String> {
        self.records.iter()
            .map(|record| field.of(record).to_string())
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect()
    }
}

/// The output fields a query may release a noisy mean over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputField {
    Savings,
    Eui,
    Cvrmse,
    Nmbe,
}

impl OutputField {
    pub fn of(self, record: &Record) -> Float {
        match self {
            OutputField::Savings => record.savings,
            OutputField::Eui => record.eui,
            OutputField::Cvrmse => record.cvrmse,
            OutputField::Nmbe => record.nmbe,
        }
    }

    /// The declared release configuration for this field.
    pub fn spec(self) -> OutputSpec {
        match self {
            OutputField::Savings => OutputSpec { label: "Average Savings", value_range: 100. },
            OutputField::Eui => OutputSpec { label: "Energy Use Intensity", value_range: 2000. },
            OutputField::Cvrmse => OutputSpec { label: "CV(RMSE)", value_range: 10. },
            OutputField::Nmbe => OutputSpec { label: "NMBE", value_range: 50. },
        }
    }
}

/// Release configuration for one output field.
///
/// `value_range` is the assumed global sensitivity of a single record on the
/// field: the widest plausible max − min spread, fixed at configuration time.
/// It is deliberately never derived from the filtered data (that would itself
/// leak), and it is not validated against the data either: the epsilon
/// guarantee holds only while true values stay inside the declared range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputSpec {
    pub label: &'static str,
    pub value_range: Float,
}

/// The user-chosen accuracy slider position, an integer in [1, 20].
///
/// Larger levels mean a larger epsilon: less noise, weaker privacy. The
/// privacy-loss parameter is `level / 100`, the single transform used
/// everywhere a mechanism is calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccuracyLevel(Integer);

impl AccuracyLevel {
    pub const MIN: Integer = 1;
    pub const MAX: Integer = 20;

    /// Construct a level, rejecting values outside the slider's domain.
    pub fn new(level: Integer) -> Result<AccuracyLevel> {
        if level < AccuracyLevel::MIN || level > AccuracyLevel::MAX {
            return Err(ErrorKind::InvalidAccuracyLevel(level).into());
        }
        Ok(AccuracyLevel(level))
    }

    /// Construct a level, snapping out-of-domain values to the nearest bound.
    pub fn clamped(level: Integer) -> AccuracyLevel {
        let snapped = level.max(AccuracyLevel::MIN).min(AccuracyLevel::MAX);
        if snapped != level {
            warn!(level, snapped, "accuracy level outside [1, 20], snapping to bound");
        }
        AccuracyLevel(snapped)
    }

    pub fn value(self) -> Integer {
        self.0
    }

    /// The privacy-loss parameter this level resolves to.
    pub fn epsilon(self) -> Float {
        self.0 as Float / 100.
    }

    /// Share of the per-session budget one release at this level consumes.
    pub fn cost_percent(self) -> Float {
        privacy::privacy_cost_percent(self.epsilon())
    }
}

/// Per-session query state: the submit-counter value of the last release.
///
/// Zero means no release has been served; the UI's click counter is 1-based.
/// No durable cross-session ledger exists behind this counter, so budget
/// enforcement is advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub last_served_clicks: Integer,
}

/// One fully parameterized query, built fresh from UI control values.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: QueryFilter,
    pub output: OutputField,
    pub accuracy: AccuracyLevel,
    /// The submit button's monotone click counter; `None` before any submit.
    pub clicks: Option<Integer>,
}

/// The privatized value of a released mean, paired with the deterministic
/// two-sided error bound of the mechanism that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Nothing has been submitted, or the filter changed without a re-submit.
    NoResultYet,
    /// A fresh noisy release.
    Ready { noisy_mean: Float, error_bound: Float },
    /// The filter matched no records; nothing can be released.
    EmptyResult,
}

impl QueryOutcome {
    /// Render the outcome the way the dashboard displays it: `"-"` for both
    /// placeholder states, otherwise the rounded value with its `±` bound.
    pub fn display(&self) -> String {
        match self {
            QueryOutcome::NoResultYet | QueryOutcome::EmptyResult => "-".to_string(),
            QueryOutcome::Ready { noisy_mean, error_bound } =>
                format!("{:.1}% ±{:.1}%", noisy_mean, error_bound),
        }
    }
}

/// Everything `run_query` hands back to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// Number of records matching the filter. Always reported, even before
    /// the first submit.
    pub count: Integer,
    pub outcome: QueryOutcome,
    /// The mechanism's two-sided error bound at the current epsilon and
    /// result-set size; `None` while the result set is empty.
    pub error_bound: Option<Float>,
    /// Session state to thread into the next invocation.
    pub session: SessionState,
}

#[cfg(test)]
pub mod test_data {
    use super::*;

    pub fn record(building_type: &str, ecm: &str, savings: Float) -> Record {
        Record {
            lat: 37.77,
            lng: -122.42,
            ecm: ecm.to_string(),
            building_type: building_type.to_string(),
            year_built: 1975.,
            savings,
            eui: 900.,
            cvrmse: 4.,
            nmbe: 20.,
        }
    }

    pub fn portfolio() -> Dataset {
        Dataset::new(vec![
            record("Office", "HVAC System", 8.),
            record("Office", "Roof Insulation", 12.),
            record("Hotel", "HVAC System", 6.),
            record("Retail Store", "Building Leakage", 10.),
        ])
    }
}
