/*!
Core of a voter registry kept in memory.

The crate is organised as a pipeline:

* [schema] lists the columns of the CSV format, in export order
* [csv_codec] turns records into CSV text and back, rejecting batches with
  missing mandatory fields
* [store::VoterStore] owns the records and applies mutations after a
  simulated latency
* [query] derives the filtered, paginated view shown in the voter table

```
use voter_registry::*;

let ids = IdGenerator::new();
let text = "Voter ID,Full Name,Gender,Age\nMH01,Jane Doe,Female,34\nMH02,John Doe,Male,52\n";
let voters = csv_codec::parse(text, &ids)?;

let filters = VoterFilters {
    age_range: Some(AgeBracket::From51),
    ..VoterFilters::default()
};
let matching = filter_voters(&voters, "doe", &filters);
assert_eq!(matching.len(), 1);
assert_eq!(matching[0].full_name, "John Doe");

let page = paginate(&matching, DEFAULT_PAGE_SIZE, 1)?;
assert_eq!(page.total_pages, 1);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

mod config;

pub mod builder;
pub mod csv_codec;
pub mod query;
pub mod schema;
pub mod stats;
pub mod store;

pub use crate::config::*;
pub use crate::csv_codec::{FormatError, ParseReport};
pub use crate::query::{
    facet, filter_voters, paginate, AgeBracket, ListSummary, Page, QueryError, VoterFilters,
    VoterListView, DEFAULT_PAGE_SIZE,
};
pub use crate::schema::Field;
pub use crate::stats::RegistryStats;
pub use crate::store::VoterStore;
