use ecmnoise_validator::base::{Dataset, QueryFilter};

/// Indices of the records matching a filter conjunction, in dataset order.
///
/// # Example
/// ```
/// use ecmnoise_validator::base::{CategoricalField, Dataset, Predicate, QueryFilter};
/// use ecmnoise_runtime::components::filter::apply_filter;
///
/// let dataset = Dataset::new(vec![]);
/// let filter = QueryFilter::all().and(Predicate::equals(CategoricalField::Ecm, "HVAC System"));
/// assert!(apply_filter(&dataset, &filter).is_empty());
/// ```
pub fn apply_filter(dataset: &Dataset, filter: &QueryFilter) -> Vec<usize> {
    dataset.records().iter().enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(index, _)| index)
        .collect()
}
