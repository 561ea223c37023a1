//! One-shot CSV materialization of the portfolio dataset.
//!
//! The dataset is loaded once at process start and never mutated. Rows that
//! fail to parse are dropped with a warning rather than aborting the load;
//! the source is a synthetic export, not user input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use ecmnoise_validator::base::{Dataset, Record};
use ecmnoise_validator::errors::*;

/// Read a headered CSV with columns
/// `lat,lng,ecm,building_type,year_built,savings,eui,cvrmse,nmbe` into a
/// [`Dataset`].
pub fn from_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut records: Vec<Record> = Vec::new();
    for row in reader.deserialize() {
        match row {
            Ok(record) => records.push(record),
            Err(err) => warn!("dropping unparseable portfolio row: {}", err),
        }
    }
    Ok(Dataset::new(records))
}

pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path.as_ref())
        .map_err(|err| Error::from(format!(
            "unable to open portfolio dataset {:?}: {}", path.as_ref(), err)))?;
    from_csv(file)
}

#[cfg(test)]
mod test_materialize {
    use super::*;

    const HEADER: &str = "lat,lng,ecm,building_type,year_built,savings,eui,cvrmse,nmbe\n";

    #[test]
    fn parses_well_formed_rows() {
        let csv = format!(
            "{}37.77,-122.42,HVAC System,Office,1962,8.5,900,4,20\n\
             37.78,-122.41,Roof Insulation,Hotel,1988,12.0,1100,6,31\n",
            HEADER);
        let dataset = from_csv(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].building_type, "Office");
        assert_eq!(dataset.records()[0].year_built, 1962.);
        assert_eq!(dataset.records()[1].savings, 12.0);
    }

    #[test]
    fn drops_unparseable_rows_and_keeps_the_rest() {
        let csv = format!(
            "{}37.77,-122.42,HVAC System,Office,1962,8.5,900,4,20\n\
             not-a-latitude,-122.41,Roof Insulation,Hotel,1988,12.0,1100,6,31\n\
             37.79,-122.40,Building Leakage,Retail Store,1940,6.0,700,3,12\n",
            HEADER);
        let dataset = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn empty_input_yields_an_empty_dataset() {
        let dataset = from_csv(HEADER.as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(from_csv_path("/nonexistent/portfolio.csv").is_err());
    }
}
