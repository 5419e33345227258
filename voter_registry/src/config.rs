// ********* Record data structures ***********

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The identifier of a record inside the registry.
///
/// It is assigned by the registry (when adding a voter or decoding a CSV
/// batch) and never reused during the lifetime of the process. It is
/// unrelated to the `voterId` field, which is supplied by the user.
#[derive(
    Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh record ids.
///
/// Clones share the same counter, so the store and the CSV decoder can
/// hand out ids from a single sequence.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Arc<AtomicU64>,
}

impl IdGenerator {
    pub fn new() -> IdGenerator {
        IdGenerator::default()
    }

    pub fn next_id(&self) -> RecordId {
        RecordId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// One row of the registry.
///
/// All the fields are free text except `age`. The serialized names follow
/// the camelCase convention of the mock datasets.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Voter {
    pub id: RecordId,
    pub voter_id: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub relative_name: String,
    pub house_no: String,
    pub address_line1: String,
    pub address_line2: String,
    pub gender: String,
    pub age: u32,
    pub mobile_number: String,
    pub caste: String,
    pub section_details: String,
    pub yadi_number: String,
    pub assembly_constituency_number: String,
    pub assembly_constituency_name: String,
    pub assembly_reservation_status: String,
    pub lok_sabha_constituency_number: String,
    pub lok_sabha_constituency_name: String,
    pub lok_sabha_reservation_status: String,
    pub hometown: String,
    pub police_station: String,
    pub taluka: String,
    pub district: String,
    pub pin_code: String,
}

impl Voter {
    /// True if the three mandatory fields (voter id, full name, gender) are filled.
    pub fn has_required_fields(&self) -> bool {
        !self.voter_id.is_empty() && !self.full_name.is_empty() && !self.gender.is_empty()
    }
}

/// A partial voter: only the supplied fields are `Some`.
///
/// Used to create a record (missing fields are left empty) or to merge new
/// values over an existing record.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoterPatch {
    pub voter_id: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub relative_name: Option<String>,
    pub house_no: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub mobile_number: Option<String>,
    pub caste: Option<String>,
    pub section_details: Option<String>,
    pub yadi_number: Option<String>,
    pub assembly_constituency_number: Option<String>,
    pub assembly_constituency_name: Option<String>,
    pub assembly_reservation_status: Option<String>,
    pub lok_sabha_constituency_number: Option<String>,
    pub lok_sabha_constituency_name: Option<String>,
    pub lok_sabha_reservation_status: Option<String>,
    pub hometown: Option<String>,
    pub police_station: Option<String>,
    pub taluka: Option<String>,
    pub district: Option<String>,
    pub pin_code: Option<String>,
}

fn merge(target: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        target.clone_from(v);
    }
}

impl VoterPatch {
    /// Writes every supplied field over the given record. The id is never touched.
    pub fn apply_to(&self, voter: &mut Voter) {
        merge(&mut voter.voter_id, &self.voter_id);
        merge(&mut voter.full_name, &self.full_name);
        merge(&mut voter.first_name, &self.first_name);
        merge(&mut voter.last_name, &self.last_name);
        merge(&mut voter.relative_name, &self.relative_name);
        merge(&mut voter.house_no, &self.house_no);
        merge(&mut voter.address_line1, &self.address_line1);
        merge(&mut voter.address_line2, &self.address_line2);
        merge(&mut voter.gender, &self.gender);
        if let Some(age) = self.age {
            voter.age = age;
        }
        merge(&mut voter.mobile_number, &self.mobile_number);
        merge(&mut voter.caste, &self.caste);
        merge(&mut voter.section_details, &self.section_details);
        merge(&mut voter.yadi_number, &self.yadi_number);
        merge(
            &mut voter.assembly_constituency_number,
            &self.assembly_constituency_number,
        );
        merge(
            &mut voter.assembly_constituency_name,
            &self.assembly_constituency_name,
        );
        merge(
            &mut voter.assembly_reservation_status,
            &self.assembly_reservation_status,
        );
        merge(
            &mut voter.lok_sabha_constituency_number,
            &self.lok_sabha_constituency_number,
        );
        merge(
            &mut voter.lok_sabha_constituency_name,
            &self.lok_sabha_constituency_name,
        );
        merge(
            &mut voter.lok_sabha_reservation_status,
            &self.lok_sabha_reservation_status,
        );
        merge(&mut voter.hometown, &self.hometown);
        merge(&mut voter.police_station, &self.police_station);
        merge(&mut voter.taluka, &self.taluka);
        merge(&mut voter.district, &self.district);
        merge(&mut voter.pin_code, &self.pin_code);
    }

    /// Builds a full record out of this patch.
    pub fn to_voter(&self, id: RecordId) -> Voter {
        let mut voter = Voter {
            id,
            ..Voter::default()
        };
        self.apply_to(&mut voter);
        voter
    }
}

// ********* Store configuration **********

/// Simulated latencies of the store operations.
///
/// The defaults are the delays of the admin panel. Tests usually
/// set them to zero or run on a paused clock.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct StoreSettings {
    /// Delay of `add`, `update` and `delete`.
    pub mutation_latency: std::time::Duration,
    /// Delay of `bulk_import`.
    pub import_latency: std::time::Duration,
}

impl StoreSettings {
    pub const DEFAULT_SETTINGS: StoreSettings = StoreSettings {
        mutation_latency: std::time::Duration::from_millis(500),
        import_latency: std::time::Duration::from_millis(1000),
    };

    pub const IMMEDIATE: StoreSettings = StoreSettings {
        mutation_latency: std::time::Duration::ZERO,
        import_latency: std::time::Duration::ZERO,
    };
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings::DEFAULT_SETTINGS
    }
}
