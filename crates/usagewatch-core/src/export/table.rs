//! CSV rendering of the usage log

use serde_json::Value;

use crate::usage::usage_rows;

/// Header row of the usage report
pub const CSV_HEADER: [&str; 5] = [
    "App Name",
    "Category",
    "Total Duration (s)",
    "Sessions",
    "Last Used",
];

/// Render one header line plus one line per application
///
/// Lines are `\n`-separated without a trailing newline. Values containing
/// commas or quotes are quoted so every record keeps five fields.
pub fn to_csv(log: &Value) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for row in usage_rows(log) {
        wtr.write_record(row.fields())?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    let mut out = String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
