//! Small reference tables shared by the unit tests.

use crate::tables::{CountryRecord, ReferenceTables};

pub(crate) fn reference_tables() -> ReferenceTables {
    let mut tables = ReferenceTables::default();

    tables
        .countries
        .insert(CountryRecord::new("France").with_zip_code(&["f", "fr"], &[5]))
        .insert(CountryRecord::new("Sweden").with_zip_code(&["s", "se"], &[5]))
        .insert(CountryRecord::new("Germany").with_zip_code(&["d"], &[5]))
        .insert(CountryRecord::new("United Kingdom"))
        .insert(CountryRecord::new("United States").with_zip_code(&[], &[5]))
        .insert(CountryRecord::new("Canada"))
        .insert(CountryRecord::new("Algeria").with_zip_code(&[], &[5]));

    tables
        .towns
        .insert("France", "Grenoble")
        .insert("France", "Paris")
        .insert("Sweden", "Lund");

    tables
        .institution_types
        .insert("Nro", 1)
        .insert("Rto", 2)
        .insert("Univ", 3);

    tables
        .affiliations
        .insert("France", "CEA Nro", &["CEA", "Commissariat a l'Energie Atomique"])
        .insert("France", "CNRS Nro", &["CNRS"])
        .insert("France", "LITEN Rto", &["LITEN"])
        .insert("France", "UGA Univ", &["Univ Grenoble Alpes"])
        .insert("France", "Paris-Cité Univ", &["Univ Paris"])
        .insert("France", "Paris-Saclay Univ", &["Univ Paris Saclay"])
        .insert("Sweden", "Lund Univ", &["Lund University"]);

    tables
}
