use log::{debug, info, warn};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::{prelude::*, Snafu};
use text_diff::print_diff;

use voter_registry::csv_codec::{parse_report, serialize};
use voter_registry::query::facet;
use voter_registry::*;

use crate::args::Args;
use crate::desk::io_files::*;

pub mod io_files;

#[derive(Debug, Snafu)]
pub enum DeskError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the voters of {path}"))]
    ParsingSeed {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Voter #{index} of {path} misses its Voter ID, Full Name or Gender"))]
    IncompleteSeedVoter { path: String, index: usize },
    #[snafu(display("{source}"))]
    Importing { source: FormatError },
    #[snafu(display("{source}"))]
    Querying { source: QueryError },
    #[snafu(display("Unknown column {label:?}"))]
    UnknownColumn { label: String },
    #[snafu(display("Error formatting the output"))]
    FormattingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DeskResult<T> = Result<T, DeskError>;

pub mod seed_reader {
    use crate::desk::*;

    /// Reads the mock dataset: a JSON array of voters. Ids in the file are
    /// ignored; the store assigns its own.
    pub fn read_seed(path: &str) -> DeskResult<Vec<Voter>> {
        let contents = read_text(path)?;
        let voters: Vec<Voter> =
            serde_json::from_str(contents.as_str()).context(ParsingSeedSnafu { path })?;
        for (index, v) in voters.iter().enumerate() {
            ensure!(
                v.has_required_fields(),
                IncompleteSeedVoterSnafu {
                    path,
                    index: index + 1
                }
            );
        }
        debug!("read_seed: {} voters from {}", voters.len(), path);
        Ok(voters)
    }
}

fn store_settings(args: &Args) -> StoreSettings {
    match args.latency_ms {
        Some(ms) => StoreSettings {
            mutation_latency: std::time::Duration::from_millis(ms),
            import_latency: std::time::Duration::from_millis(2 * ms),
        },
        None => StoreSettings::IMMEDIATE,
    }
}

/// Builds the registry: seed dataset first, then the imported file.
///
/// The file is decoded completely before anything is added, so a rejected
/// file leaves the registry as it was.
pub async fn load_registry(args: &Args) -> DeskResult<VoterStore> {
    let seed = match &args.seed {
        Some(p) => seed_reader::read_seed(p)?,
        None => Vec::new(),
    };
    let store = VoterStore::with_voters(store_settings(args), seed);

    if let Some(path) = &args.input {
        info!("Attempting to import voters from {:?}", path);
        let text = read_text(path)?;
        let report = parse_report(&text, store.ids()).context(ImportingSnafu {})?;
        if report.skipped_rows > 0 {
            warn!(
                "{}: skipped {} row(s) with missing columns",
                simplify_file_name(path),
                report.skipped_rows
            );
        }
        let imported = store.bulk_import(report.voters).await;
        info!(
            "Successfully imported {} voters from {}",
            imported.len(),
            simplify_file_name(path)
        );
    }
    Ok(store)
}

fn text_filter(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

/// The voter list state described by the command line.
pub fn build_view(args: &Args) -> DeskResult<VoterListView> {
    let mut view = VoterListView::new(args.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
        .context(QueryingSnafu {})?;
    let age_range = match text_filter(&args.age_range) {
        Some(s) => Some(s.parse::<AgeBracket>().context(QueryingSnafu {})?),
        None => None,
    };
    view.set_filters(VoterFilters {
        gender: text_filter(&args.gender),
        age_range,
        caste: text_filter(&args.caste),
        district: text_filter(&args.district),
        assembly_constituency: text_filter(&args.assembly),
    });
    view.set_search(args.search.as_deref().unwrap_or(""));
    // Filters reset the page, so the page goes last.
    view.set_page(args.page.unwrap_or(1));
    Ok(view)
}

/// Assembles what the panel would display: the current page of the list,
/// and optionally the dashboard figures and filter options.
pub fn build_report(args: &Args, voters: &[Voter]) -> DeskResult<JSValue> {
    let mut view = build_view(args)?;
    let summary = view.render(voters);
    info!(
        "Showing {} to {} of {} results ({} voters in total), page {} of {}",
        summary.page.first_shown(),
        summary.page.last_shown(),
        summary.shown_count,
        summary.total_count,
        summary.current_page,
        summary.total_pages
    );

    let mut report: JSMap<String, JSValue> = JSMap::new();
    if args.stats {
        let stats = RegistryStats::compute(voters);
        report.insert(
            "stats".to_string(),
            serde_json::to_value(stats).context(FormattingJsonSnafu {})?,
        );
    }
    if let Some(labels) = &args.facet {
        let mut facets: JSMap<String, JSValue> = JSMap::new();
        for label in labels {
            let field = Field::from_label(label).context(UnknownColumnSnafu { label })?;
            facets.insert(label.clone(), json!(facet(voters, field)));
        }
        report.insert("facets".to_string(), JSValue::Object(facets));
    }
    report.insert(
        "list".to_string(),
        json!({
            "voters": summary.page.items,
            "firstShown": summary.page.first_shown(),
            "lastShown": summary.page.last_shown(),
            "shownCount": summary.shown_count,
            "totalCount": summary.total_count,
            "currentPage": summary.current_page,
            "totalPages": summary.total_pages,
            "pageButtons": summary.page_buttons,
            "activeFilters": summary.active_filters,
        }),
    );
    Ok(JSValue::Object(report))
}

/// Compares an export with a reference file, printing the differences.
pub fn check_reference(exported: &str, reference_path: &str) -> DeskResult<()> {
    let reference = read_text(reference_path)?;
    // Editors often add a final newline to the reference.
    if reference.trim_end() != exported.trim_end() {
        warn!("Found differences with the reference file");
        print_diff(reference.trim_end(), exported.trim_end(), "\n");
        whatever!("Difference detected between the exported voters and the reference file")
    }
    info!("Export matches {}", simplify_file_name(reference_path));
    Ok(())
}

pub async fn run_session(args: &Args) -> DeskResult<()> {
    let store = load_registry(args).await?;
    let voters = store.snapshot().await;

    let report = build_report(args, &voters)?;
    let pretty_js = serde_json::to_string_pretty(&report).context(FormattingJsonSnafu {})?;
    println!("{}", pretty_js);

    if args.out.is_none() && args.reference.is_none() {
        return Ok(());
    }
    let exported = serialize(&voters);
    if let Some(dest) = &args.out {
        if exported.is_empty() {
            warn!("No voters to export, nothing written to {}", dest);
        } else {
            write_export(dest, &exported)?;
            info!("Successfully exported {} voters", voters.len());
        }
    }
    if let Some(reference_path) = &args.reference {
        check_reference(&exported, reference_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::ErrorCompat;

    fn testdata(name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn base_args() -> Args {
        Args {
            seed: Some(testdata("seed_voters.json")),
            input: Some(testdata("import_ok.csv")),
            ..Args::default()
        }
    }

    fn run_session_test(args: &Args) -> DeskResult<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let res = rt.block_on(run_session(args));
        if let Err(e) = &res {
            eprintln!("An error occured {}", e);
            if let Some(bt) = ErrorCompat::backtrace(e) {
                eprintln!("trace: {}", bt);
            }
        }
        res
    }

    #[tokio::test]
    async fn seed_and_import() {
        let _ = env_logger::try_init();
        let store = load_registry(&base_args()).await.unwrap();
        let voters = store.snapshot().await;
        let names: Vec<&str> = voters.iter().map(|v| v.voter_id.as_str()).collect();
        // The short row of the file is dropped.
        assert_eq!(
            names,
            vec!["MH/21/001", "MH/21/002", "MH/24/117", "MH/24/201", "MH/24/203"]
        );
        let mut ids: Vec<RecordId> = voters.iter().map(|v| v.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn rejected_import_commits_nothing() {
        let args = Args {
            input: Some(testdata("import_missing_gender.csv")),
            ..base_args()
        };
        let err = load_registry(&args).await.err().unwrap();
        assert!(matches!(err, DeskError::Importing { .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn malformed_seed_is_rejected() {
        let err = seed_reader::read_seed(&testdata("import_ok.csv")).unwrap_err();
        assert!(matches!(err, DeskError::ParsingSeed { .. }));
    }

    #[tokio::test]
    async fn filtered_report() {
        let args = Args {
            district: Some("Satara".to_string()),
            age_range: Some("51+".to_string()),
            facet: Some(vec!["District".to_string(), "Gender".to_string()]),
            stats: true,
            ..base_args()
        };
        let store = load_registry(&args).await.unwrap();
        let voters = store.snapshot().await;
        let report = build_report(&args, &voters).unwrap();

        assert_eq!(report["stats"]["totalVoters"], json!(5));
        assert_eq!(report["stats"]["maleVoters"], json!(3));
        assert_eq!(report["stats"]["averageAge"], json!(35));
        assert_eq!(report["facets"]["District"], json!(["Pune", "Satara"]));
        assert_eq!(report["facets"]["Gender"], json!(["Male", "Female"]));
        assert_eq!(report["list"]["shownCount"], json!(1));
        assert_eq!(report["list"]["totalCount"], json!(5));
        assert_eq!(report["list"]["activeFilters"], json!(2));
        assert_eq!(
            report["list"]["voters"][0]["fullName"],
            json!("Kavita Jadhav")
        );
    }

    #[test]
    fn unknown_inputs() {
        let args = Args {
            age_range: Some("60-70".to_string()),
            ..Args::default()
        };
        assert!(matches!(build_view(&args), Err(DeskError::Querying { .. })));
        let args = Args {
            facet: Some(vec!["Ward".to_string()]),
            ..Args::default()
        };
        assert!(matches!(
            build_report(&args, &[]),
            Err(DeskError::UnknownColumn { .. })
        ));
        let args = Args {
            page_size: Some(0),
            ..Args::default()
        };
        assert!(build_view(&args).is_err());
    }

    #[test]
    fn page_is_applied_after_filters() {
        let args = Args {
            gender: Some("Male".to_string()),
            page: Some(4),
            page_size: Some(1),
            ..Args::default()
        };
        let view = build_view(&args).unwrap();
        assert_eq!(view.current_page(), 4);
        assert_eq!(view.filters().active_count(), 1);
    }

    #[test]
    fn export_matches_reference() {
        let args = Args {
            reference: Some(testdata("export_reference.csv")),
            ..base_args()
        };
        assert!(run_session_test(&args).is_ok());
    }

    #[test]
    fn export_differs_from_reference() {
        let args = Args {
            input: None,
            reference: Some(testdata("export_reference.csv")),
            ..base_args()
        };
        assert!(matches!(
            run_session_test(&args),
            Err(DeskError::Whatever { .. })
        ));
    }
}
