//! Reading and writing the voter CSV format.

use std::collections::HashMap;

use log::{debug, info};
use snafu::{prelude::*, Snafu};

use crate::config::{IdGenerator, Voter};
use crate::schema::{header_labels, Field, REQUIRED_FIELDS};

/// Errors raised while decoding a CSV batch.
///
/// Decoding is all or nothing: when one of these is returned, none of the
/// rows of the batch should be committed to the store.
#[derive(Debug, Snafu)]
pub enum FormatError {
    #[snafu(display(
        "Invalid CSV format: expected a header line and at least one data line, found {non_blank} non-blank line(s)"
    ))]
    MissingData { non_blank: usize },
    #[snafu(display(
        "Invalid voter data at line {lineno}: missing required fields ({})",
        missing.join(", ")
    ))]
    MissingRequiredFields {
        lineno: u64,
        missing: Vec<&'static str>,
    },
    #[snafu(display("Invalid CSV format: {source}"))]
    CsvRead { source: csv::Error },
}

pub type CodecResult<T> = Result<T, FormatError>;

/// The outcome of decoding a batch.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParseReport {
    pub voters: Vec<Voter>,
    /// Data rows dropped because they had fewer cells than the header.
    pub skipped_rows: usize,
}

/// Encodes the records to CSV text.
///
/// An empty input gives an empty string, not a header-only file. Every cell
/// is quoted; the first column is the 1-based position in `voters`.
pub fn serialize(voters: &[Voter]) -> String {
    if voters.is_empty() {
        return String::new();
    }
    let mut lines: Vec<String> = Vec::with_capacity(voters.len() + 1);
    lines.push(header_labels().join(","));
    for (idx, voter) in voters.iter().enumerate() {
        let cells: Vec<String> = Field::ALL
            .iter()
            .map(|f| quote(&f.value(voter, idx + 1)))
            .collect();
        lines.push(cells.join(","));
    }
    debug!("serialize: encoded {} voters", voters.len());
    lines.join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Decodes CSV text into records, each with a fresh id.
pub fn parse(text: &str, ids: &IdGenerator) -> CodecResult<Vec<Voter>> {
    parse_report(text, ids).map(|r| r.voters)
}

/// Same as [parse], also reporting how many short rows were dropped.
///
/// Columns are looked up by header label, so the column order of the input
/// does not matter. Labels missing from the header decode as empty text.
pub fn parse_report(text: &str, ids: &IdGenerator) -> CodecResult<ParseReport> {
    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    ensure!(non_blank >= 2, MissingDataSnafu { non_blank });

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut records = rdr
        .records()
        .filter(|r| !matches!(r, Ok(rec) if is_blank(rec)));

    let header = match records.next() {
        Some(r) => r.context(CsvReadSnafu {})?,
        None => return MissingDataSnafu { non_blank }.fail(),
    };
    let num_columns = header.len();
    // The first occurrence of a label wins.
    let mut columns: HashMap<Field, usize> = HashMap::new();
    for (idx, label) in header.iter().enumerate() {
        if let Some(f) = Field::from_label(label) {
            columns.entry(f).or_insert(idx);
        }
    }
    debug!("parse: header {:?} columns {:?}", header, columns);

    let mut voters: Vec<Voter> = Vec::new();
    let mut skipped_rows: usize = 0;
    for record_r in records {
        let record = record_r.context(CsvReadSnafu {})?;
        let lineno = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() < num_columns {
            debug!(
                "parse: line {}: skipping short row ({} < {} cells)",
                lineno,
                record.len(),
                num_columns
            );
            skipped_rows += 1;
            continue;
        }

        let mut voter = Voter::default();
        for (field, idx) in columns.iter() {
            field.assign(&mut voter, record.get(*idx).unwrap_or(""));
        }

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .filter(|f| f.text(&voter).map_or(true, |s| s.is_empty()))
            .map(|f| f.label())
            .collect();
        ensure!(
            missing.is_empty(),
            MissingRequiredFieldsSnafu { lineno, missing }
        );
        voters.push(voter);
    }

    // Only hand out ids once the whole batch is known to be valid.
    for voter in voters.iter_mut() {
        voter.id = ids.next_id();
    }
    info!(
        "parse: decoded {} voters, skipped {} short rows",
        voters.len(),
        skipped_rows
    );
    Ok(ParseReport {
        voters,
        skipped_rows,
    })
}

// A line holding nothing but whitespace. Rows of empty cells such as `,,`
// are not blank and go through the usual checks.
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).map_or(true, |c| c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordId;

    fn voter(voter_id: &str, full_name: &str, gender: &str, age: u32) -> Voter {
        Voter {
            voter_id: voter_id.to_string(),
            full_name: full_name.to_string(),
            gender: gender.to_string(),
            age,
            ..Voter::default()
        }
    }

    fn without_ids(voters: &[Voter]) -> Vec<Voter> {
        voters
            .iter()
            .map(|v| Voter {
                id: RecordId::default(),
                ..v.clone()
            })
            .collect()
    }

    #[test]
    fn empty_export() {
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn export_layout() {
        let mut a = voter("MH0001", "Jane Doe", "Female", 34);
        a.id = RecordId(40);
        a.district = "Pune".to_string();
        let b = voter("MH0002", "John Doe", "Male", 0);
        let text = serialize(&[a, b]);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Sr. No.,Voter ID,Full Name,First Name,"));
        assert!(lines[0].ends_with(",District,Pin Code"));
        // The serial number is the position, not the id.
        assert!(lines[1].starts_with(r#""1","MH0001","Jane Doe","","""#));
        assert!(lines[1].ends_with(r#","Pune","""#));
        assert!(lines[2].starts_with(r#""2","MH0002""#));
        assert_eq!(lines[1].matches("\",\"").count(), 25);
    }

    #[test]
    fn round_trip() {
        let _ = env_logger::try_init();
        let mut a = voter("MH0001", "Jane Doe", "Female", 34);
        a.mobile_number = "9876543210".to_string();
        a.address_line1 = "12, Station Road".to_string();
        a.caste = "General".to_string();
        a.lok_sabha_reservation_status = "SC".to_string();
        let mut b = voter("MH0002", "Ravi \"Bunty\" Patil", "Male", 61);
        b.pin_code = "411001".to_string();
        let c = voter("MH0003", "Asha", "Other", 0);
        let originals = vec![a, b, c];

        let ids = IdGenerator::new();
        let decoded = parse(&serialize(&originals), &ids).unwrap();
        assert_eq!(without_ids(&decoded), without_ids(&originals));
    }

    #[test]
    fn fresh_ids_for_each_row() {
        let ids = IdGenerator::new();
        let text = "Voter ID,Full Name,Gender\nV1,Jane,Female\nV2,John,Male\n";
        let first = parse(text, &ids).unwrap();
        let second = parse(text, &ids).unwrap();
        let mut all: Vec<RecordId> = first.iter().chain(second.iter()).map(|v| v.id).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn header_only_is_rejected() {
        let ids = IdGenerator::new();
        let res = parse("Voter ID,Full Name,Gender\n", &ids);
        assert!(matches!(res, Err(FormatError::MissingData { non_blank: 1 })));
        assert!(matches!(
            parse("  \n\n", &ids),
            Err(FormatError::MissingData { non_blank: 0 })
        ));
    }

    #[test]
    fn missing_required_field_fails_whole_batch() {
        let ids = IdGenerator::new();
        let text = "Voter ID,Full Name,Gender\nV1,Jane,Female\nV2,John,\nV3,Anil,Male\n";
        let err = parse(text, &ids).unwrap_err();
        match &err {
            FormatError::MissingRequiredFields { lineno, missing } => {
                assert_eq!(*lineno, 3);
                assert_eq!(missing, &vec!["Gender"]);
            }
            e => panic!("unexpected error {:?}", e),
        }
        assert!(err.to_string().contains("line 3"));
        // No ids were consumed by the failed batch.
        assert_eq!(ids.next_id(), RecordId(1));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let ids = IdGenerator::new();
        let text = "Voter ID,Full Name\nV1,Jane\n";
        let err = parse(text, &ids).unwrap_err();
        assert!(err.to_string().contains("Gender"));
    }

    #[test]
    fn short_rows_are_skipped() {
        let ids = IdGenerator::new();
        let text = "Voter ID,Full Name,Gender,Age\nV1,Jane\nV2,John,Male,40\n";
        let report = parse_report(text, &ids).unwrap();
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.voters.len(), 1);
        assert_eq!(report.voters[0].voter_id, "V2");
        assert_eq!(report.voters[0].age, 40);
    }

    #[test]
    fn column_order_does_not_matter() {
        let ids = IdGenerator::new();
        let text = "Gender,Age,District,Full Name,Voter ID,Extra\n\
                    \"Female\",\" 27 \",\"Nashik\",\"Meera Joshi\",\"MH77\",\"x\"\n";
        let voters = parse(text, &ids).unwrap();
        assert_eq!(voters.len(), 1);
        let v = &voters[0];
        assert_eq!(v.voter_id, "MH77");
        assert_eq!(v.full_name, "Meera Joshi");
        assert_eq!(v.gender, "Female");
        assert_eq!(v.age, 27);
        assert_eq!(v.district, "Nashik");
        assert_eq!(v.taluka, "");
    }

    #[test]
    fn blank_lines_and_bad_ages() {
        let ids = IdGenerator::new();
        let text = "\nVoter ID,Full Name,Gender,Age\n\n  \nV1,Jane,Female,unknown\n\n";
        let voters = parse(text, &ids).unwrap();
        assert_eq!(voters.len(), 1);
        assert_eq!(voters[0].age, 0);
    }

    #[test]
    fn rows_of_empty_cells_are_not_blank_lines() {
        let ids = IdGenerator::new();
        let err = parse("Voter ID,Full Name,Gender\n\"\",\"\",\"\"\n", &ids).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingRequiredFields { lineno: 2, .. }
        ));
        let err = parse("Voter ID,Full Name,Gender\nV1,Jane,Female\n,,\n", &ids).unwrap_err();
        assert!(err.to_string().contains("line 3"));
        // An exported record with no data fails the same way.
        let exported = serialize(&[Voter::default()]);
        assert!(matches!(
            parse(&exported, &ids),
            Err(FormatError::MissingRequiredFields { lineno: 2, .. })
        ));
        assert_eq!(ids.next_id(), RecordId(1));
    }

    #[test]
    fn header_of_empty_cells_is_still_the_header() {
        let ids = IdGenerator::new();
        let err = parse(",,\nV1,Jane,Female\n", &ids).unwrap_err();
        match err {
            FormatError::MissingRequiredFields { lineno, missing } => {
                assert_eq!(lineno, 2);
                assert_eq!(missing, vec!["Voter ID", "Full Name", "Gender"]);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn quoted_commas_stay_in_their_cell() {
        let ids = IdGenerator::new();
        let text = "Voter ID,Full Name,Gender,Address Line 1\nV1,\"Doe, Jane\",Female,\"4, Lane \"\"B\"\"\"\n";
        let voters = parse(text, &ids).unwrap();
        assert_eq!(voters[0].full_name, "Doe, Jane");
        assert_eq!(voters[0].address_line1, "4, Lane \"B\"");
    }
}
