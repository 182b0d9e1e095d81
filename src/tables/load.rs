//! CSV loading of the reference tables.
//!
//! Each table is read from any [`Read`] source; [`ReferenceTables::from_dir`]
//! opens the four files of a reference directory.
//!
//! # Example
//!
//! ```
//! use affiliation_resolver::tables::InstitutionTypeOrder;
//!
//! let input = "Level,Abbreviation\n1,Nro\n2,Rto\n";
//! let types = InstitutionTypeOrder::from_csv_reader(input.as_bytes()).unwrap();
//! assert_eq!(types.level("Rto"), Some(2));
//! ```

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{
    CountryRecord, CountryTable, InstitutionTypeOrder, NormalizedAffiliationDictionary,
    ReferenceTables, TownsPerCountry,
};
use crate::utils::parse_list_cell;
use crate::{AffiliationError, Result};

const COUNTRY: &str = "Country";
const SHORT_NAME: &str = "Short name";
const GPS_COORDINATES: &str = "GPS Coordinates";
const ZIP_LETTERS: &str = "Zip code letters";
const ZIP_DIGITS: &str = "Zip code digits";
const CONTINENT: &str = "Continent";
const LEVEL: &str = "Level";
const ABBREVIATION: &str = "Abbreviation";
const NORM_AFFILIATIONS: &str = "Norm affiliations";
const TOWN_NAME: &str = "Town name";

/// File names of the reference tables inside a directory.
///
/// # Examples
///
/// ```
/// use affiliation_resolver::tables::TableFiles;
///
/// let mut files = TableFiles::new();
/// files.set_towns("Towns_2024.csv").set_countries("World.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    countries: String,
    institution_types: String,
    affiliations: String,
    towns: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            countries: "Countries.csv".to_string(),
            institution_types: "Inst_types.csv".to_string(),
            affiliations: "Country_affiliations.csv".to_string(),
            towns: "Country_towns.csv".to_string(),
        }
    }
}

impl TableFiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_countries(&mut self, file_name: &str) -> &mut Self {
        self.countries = file_name.to_string();
        self
    }

    pub fn set_institution_types(&mut self, file_name: &str) -> &mut Self {
        self.institution_types = file_name.to_string();
        self
    }

    pub fn set_affiliations(&mut self, file_name: &str) -> &mut Self {
        self.affiliations = file_name.to_string();
        self
    }

    pub fn set_towns(&mut self, file_name: &str) -> &mut Self {
        self.towns = file_name.to_string();
        self
    }
}

fn csv_reader<R: Read>(input: R) -> Reader<R> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn headers<R: Read>(reader: &mut Reader<R>) -> Result<StringRecord> {
    reader
        .headers()
        .cloned()
        .map_err(|e| AffiliationError::InvalidFormat(e.to_string()))
}

/// Index of the column named `name`, compared case-insensitively.
fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn required_column(headers: &StringRecord, name: &str) -> Result<usize> {
    column(headers, name).ok_or_else(|| AffiliationError::MissingField(name.to_string()))
}

fn cell(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or_default()
}

fn invalid_value(field: &str, message: String) -> AffiliationError {
    AffiliationError::InvalidFieldValue {
        field: field.to_string(),
        message,
    }
}

/// Parses `(lat, long)`; an empty cell gives `None`.
fn parse_gps(cell: &str) -> Result<Option<(f64, f64)>> {
    let trimmed = cell
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);
    if trimmed.trim().is_empty() {
        return Ok(None);
    }
    let coordinates: Vec<f64> = trimmed
        .split(',')
        .map(|value| value.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| invalid_value(GPS_COORDINATES, format!("{cell}: {e}")))?;
    match coordinates[..] {
        [latitude, longitude] => Ok(Some((latitude, longitude))),
        _ => Err(invalid_value(
            GPS_COORDINATES,
            format!("{cell}: expected two coordinates"),
        )),
    }
}

impl CountryTable {
    /// Reads the countries table.
    ///
    /// The zip-code cells hold bracketed lists such as `['f', 'fr']` and
    /// `[5]`. Only the `Country` column is required.
    ///
    /// # Errors
    ///
    /// Returns an error when the CSV is malformed, the `Country` column is
    /// missing, or a zip-code digit count or GPS cell cannot be parsed.
    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let headers = headers(&mut reader)?;
        let name_col = required_column(&headers, COUNTRY)?;
        let short_name_col = column(&headers, SHORT_NAME);
        let gps_col = column(&headers, GPS_COORDINATES);
        let letters_col = column(&headers, ZIP_LETTERS);
        let digits_col = column(&headers, ZIP_DIGITS);
        let continent_col = column(&headers, CONTINENT);

        let mut table = CountryTable::default();
        for result in reader.records() {
            let record = result?;
            let name = cell(&record, Some(name_col));
            if name.is_empty() {
                continue;
            }
            let zip_digits = parse_list_cell(cell(&record, digits_col))
                .iter()
                .map(|digits| {
                    digits
                        .parse::<usize>()
                        .map_err(|e| invalid_value(ZIP_DIGITS, format!("{name}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?;

            table.insert(CountryRecord {
                name: name.to_string(),
                short_name: cell(&record, short_name_col).to_string(),
                gps: parse_gps(cell(&record, gps_col))?,
                zip_letters: parse_list_cell(cell(&record, letters_col))
                    .iter()
                    .map(|letters| letters.to_lowercase())
                    .collect(),
                zip_digits,
                continent: cell(&record, continent_col).to_string(),
            });
        }
        Ok(table)
    }
}

impl InstitutionTypeOrder {
    /// Reads the `Level` and `Abbreviation` columns of the institution-type
    /// table.
    ///
    /// # Errors
    ///
    /// Returns an error when a column is missing or a level is not an integer.
    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let headers = headers(&mut reader)?;
        let level_col = required_column(&headers, LEVEL)?;
        let abbreviation_col = required_column(&headers, ABBREVIATION)?;

        let mut types = InstitutionTypeOrder::default();
        for result in reader.records() {
            let record = result?;
            let abbreviation = cell(&record, Some(abbreviation_col));
            if abbreviation.is_empty() {
                continue;
            }
            let level = cell(&record, Some(level_col))
                .parse::<i64>()
                .map_err(|e| invalid_value(LEVEL, format!("{abbreviation}: {e}")))?;
            types.insert(abbreviation, level);
        }
        Ok(types)
    }
}

impl NormalizedAffiliationDictionary {
    /// Reads the country affiliations table.
    ///
    /// Every cell besides `Country` and `Norm affiliations` is a raw
    /// spelling of the normalized name; rows may have any number of them.
    ///
    /// # Errors
    ///
    /// Returns an error when the CSV is malformed or a required column is
    /// missing.
    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let headers = headers(&mut reader)?;
        let country_col = required_column(&headers, COUNTRY)?;
        let name_col = required_column(&headers, NORM_AFFILIATIONS)?;

        let mut dictionary = NormalizedAffiliationDictionary::default();
        for result in reader.records() {
            let record = result?;
            let country = cell(&record, Some(country_col));
            let name = cell(&record, Some(name_col));
            if country.is_empty() || name.is_empty() {
                tracing::debug!(
                    line = record.position().map(|p| p.line()),
                    "Skipping affiliation row without country or name"
                );
                continue;
            }
            let raw_affiliations: Vec<&str> = record
                .iter()
                .enumerate()
                .filter(|(i, value)| *i != country_col && *i != name_col && !value.is_empty())
                .map(|(_, value)| value)
                .collect();
            dictionary.insert(country, name, &raw_affiliations);
        }
        Ok(dictionary)
    }
}

impl TownsPerCountry {
    /// Reads the `Country` and `Town name` columns of the towns table.
    ///
    /// # Errors
    ///
    /// Returns an error when the CSV is malformed or a column is missing.
    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let headers = headers(&mut reader)?;
        let country_col = required_column(&headers, COUNTRY)?;
        let town_col = required_column(&headers, TOWN_NAME)?;

        let mut towns = TownsPerCountry::default();
        for result in reader.records() {
            let record = result?;
            let country = cell(&record, Some(country_col));
            if !country.is_empty() {
                towns.insert(country, cell(&record, Some(town_col)));
            }
        }
        Ok(towns)
    }
}

impl ReferenceTables {
    /// Loads the four reference tables from `dir`.
    ///
    /// The tables are not validated here; resolvers validate them when
    /// they are built.
    ///
    /// # Errors
    ///
    /// Returns [`AffiliationError::Io`] when a file cannot be opened, or the
    /// loader error of the offending table.
    pub fn from_dir(dir: impl AsRef<Path>, files: &TableFiles) -> Result<Self> {
        let dir = dir.as_ref();
        let tables = Self {
            countries: CountryTable::from_csv_reader(File::open(dir.join(&files.countries))?)?,
            towns: TownsPerCountry::from_csv_reader(File::open(dir.join(&files.towns))?)?,
            institution_types: InstitutionTypeOrder::from_csv_reader(File::open(
                dir.join(&files.institution_types),
            )?)?,
            affiliations: NormalizedAffiliationDictionary::from_csv_reader(File::open(
                dir.join(&files.affiliations),
            )?)?,
        };
        tracing::info!(
            dir = %dir.display(),
            countries = tables.countries.len(),
            towns = tables.towns.len(),
            institution_types = tables.institution_types.len(),
            affiliations = tables.affiliations.len(),
            "Reference tables loaded"
        );
        Ok(tables)
    }
}
