use clap::Parser;

/// This is a desk for managing an in-memory voter registry.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON array of voters used to seed the registry (the mock dataset).
    /// Field names follow the camelCase convention (voterId, fullName, ...).
    #[clap(short, long, value_parser)]
    pub seed: Option<String>,

    /// (file path, optional) A CSV file to import. The first line must contain the column labels.
    /// The import is rejected as a whole if a row misses its Voter ID, Full Name or Gender.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) If specified, all the voters of the registry will be exported
    /// in CSV format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A reference CSV file. If provided, voterdesk will check that the exported
    /// registry matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (text, optional) Only list voters whose name or voter ID contains this text (ignoring case),
    /// or whose mobile number contains it.
    #[clap(long, value_parser)]
    pub search: Option<String>,

    /// (optional) Only list voters of this gender.
    #[clap(long, value_parser)]
    pub gender: Option<String>,

    /// (one of 18-25, 26-35, 36-50, 51+) Only list voters in this age range.
    #[clap(long, value_parser)]
    pub age_range: Option<String>,

    /// (optional) Only list voters of this caste.
    #[clap(long, value_parser)]
    pub caste: Option<String>,

    /// (optional) Only list voters of this district.
    #[clap(long, value_parser)]
    pub district: Option<String>,

    /// (optional) Only list voters of this assembly constituency (by name).
    #[clap(long, value_parser)]
    pub assembly: Option<String>,

    /// (default 1) The page of the voter list to show.
    #[clap(long, value_parser)]
    pub page: Option<usize>,

    /// (default 25) The number of voters per page.
    #[clap(long, value_parser)]
    pub page_size: Option<usize>,

    /// (list of column labels) Prints the distinct values of these columns, for instance
    /// --facet District --facet Caste
    #[clap(long, value_parser)]
    pub facet: Option<Vec<String>>,

    /// If passed as an argument, prints the dashboard figures (totals and average age).
    #[clap(long, takes_value = false)]
    pub stats: bool,

    /// (default 0) Simulated latency of the registry operations, in milliseconds. Imports take
    /// twice as long.
    #[clap(long, value_parser)]
    pub latency_ms: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
