//! The columns of the voter CSV format.
//!
//! Both directions of the codec go through [Field::ALL], so the label used to
//! find a column when decoding is always the one written when encoding.

use crate::config::Voter;

/// A column of the exported file, in canonical order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Field {
    /// Synthetic 1-based position of the record in the exported sequence.
    SerialNumber,
    VoterId,
    FullName,
    FirstName,
    LastName,
    RelativeName,
    HouseNo,
    AddressLine1,
    AddressLine2,
    Gender,
    Age,
    MobileNumber,
    Caste,
    SectionDetails,
    YadiNumber,
    AssemblyConstituencyNumber,
    AssemblyConstituencyName,
    AssemblyReservationStatus,
    LokSabhaConstituencyNumber,
    LokSabhaConstituencyName,
    LokSabhaReservationStatus,
    Hometown,
    PoliceStation,
    Taluka,
    District,
    PinCode,
}

/// Fields that must be non-empty for a record to be accepted.
pub const REQUIRED_FIELDS: [Field; 3] = [Field::VoterId, Field::FullName, Field::Gender];

impl Field {
    pub const ALL: [Field; 26] = [
        Field::SerialNumber,
        Field::VoterId,
        Field::FullName,
        Field::FirstName,
        Field::LastName,
        Field::RelativeName,
        Field::HouseNo,
        Field::AddressLine1,
        Field::AddressLine2,
        Field::Gender,
        Field::Age,
        Field::MobileNumber,
        Field::Caste,
        Field::SectionDetails,
        Field::YadiNumber,
        Field::AssemblyConstituencyNumber,
        Field::AssemblyConstituencyName,
        Field::AssemblyReservationStatus,
        Field::LokSabhaConstituencyNumber,
        Field::LokSabhaConstituencyName,
        Field::LokSabhaReservationStatus,
        Field::Hometown,
        Field::PoliceStation,
        Field::Taluka,
        Field::District,
        Field::PinCode,
    ];

    /// The header label of this column.
    pub fn label(self) -> &'static str {
        match self {
            Field::SerialNumber => "Sr. No.",
            Field::VoterId => "Voter ID",
            Field::FullName => "Full Name",
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::RelativeName => "Relative Name",
            Field::HouseNo => "House No",
            Field::AddressLine1 => "Address Line 1",
            Field::AddressLine2 => "Address Line 2",
            Field::Gender => "Gender",
            Field::Age => "Age",
            Field::MobileNumber => "Mobile Number",
            Field::Caste => "Caste",
            Field::SectionDetails => "Section Details",
            Field::YadiNumber => "Yadi Number",
            Field::AssemblyConstituencyNumber => "Assembly Constituency Number",
            Field::AssemblyConstituencyName => "Assembly Constituency Name",
            Field::AssemblyReservationStatus => "Assembly Reservation Status",
            Field::LokSabhaConstituencyNumber => "Lok Sabha Constituency Number",
            Field::LokSabhaConstituencyName => "Lok Sabha Constituency Name",
            Field::LokSabhaReservationStatus => "Lok Sabha Reservation Status",
            Field::Hometown => "Hometown",
            Field::PoliceStation => "Police Station",
            Field::Taluka => "Taluka",
            Field::District => "District",
            Field::PinCode => "Pin Code",
        }
    }

    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.label() == label)
    }

    /// The text value of this field for a record, `position` being the
    /// 1-based index of the record in the exported sequence.
    ///
    /// An age of 0 means unknown and is written as an empty cell.
    pub fn value(self, voter: &Voter, position: usize) -> String {
        match self {
            Field::SerialNumber => position.to_string(),
            Field::Age if voter.age == 0 => String::new(),
            Field::Age => voter.age.to_string(),
            f => f.text(voter).map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    /// Borrows the text of a string field. `None` for the numeric columns.
    pub fn text(self, voter: &Voter) -> Option<&str> {
        let s = match self {
            Field::SerialNumber | Field::Age => return None,
            Field::VoterId => &voter.voter_id,
            Field::FullName => &voter.full_name,
            Field::FirstName => &voter.first_name,
            Field::LastName => &voter.last_name,
            Field::RelativeName => &voter.relative_name,
            Field::HouseNo => &voter.house_no,
            Field::AddressLine1 => &voter.address_line1,
            Field::AddressLine2 => &voter.address_line2,
            Field::Gender => &voter.gender,
            Field::MobileNumber => &voter.mobile_number,
            Field::Caste => &voter.caste,
            Field::SectionDetails => &voter.section_details,
            Field::YadiNumber => &voter.yadi_number,
            Field::AssemblyConstituencyNumber => &voter.assembly_constituency_number,
            Field::AssemblyConstituencyName => &voter.assembly_constituency_name,
            Field::AssemblyReservationStatus => &voter.assembly_reservation_status,
            Field::LokSabhaConstituencyNumber => &voter.lok_sabha_constituency_number,
            Field::LokSabhaConstituencyName => &voter.lok_sabha_constituency_name,
            Field::LokSabhaReservationStatus => &voter.lok_sabha_reservation_status,
            Field::Hometown => &voter.hometown,
            Field::PoliceStation => &voter.police_station,
            Field::Taluka => &voter.taluka,
            Field::District => &voter.district,
            Field::PinCode => &voter.pin_code,
        };
        Some(s.as_str())
    }

    /// Writes decoded text into a record.
    ///
    /// The serial number is positional and is dropped. An age that does not
    /// parse as an integer becomes 0.
    pub fn assign(self, voter: &mut Voter, value: &str) {
        let target = match self {
            Field::SerialNumber => return,
            Field::Age => {
                voter.age = parse_age(value);
                return;
            }
            Field::VoterId => &mut voter.voter_id,
            Field::FullName => &mut voter.full_name,
            Field::FirstName => &mut voter.first_name,
            Field::LastName => &mut voter.last_name,
            Field::RelativeName => &mut voter.relative_name,
            Field::HouseNo => &mut voter.house_no,
            Field::AddressLine1 => &mut voter.address_line1,
            Field::AddressLine2 => &mut voter.address_line2,
            Field::Gender => &mut voter.gender,
            Field::MobileNumber => &mut voter.mobile_number,
            Field::Caste => &mut voter.caste,
            Field::SectionDetails => &mut voter.section_details,
            Field::YadiNumber => &mut voter.yadi_number,
            Field::AssemblyConstituencyNumber => &mut voter.assembly_constituency_number,
            Field::AssemblyConstituencyName => &mut voter.assembly_constituency_name,
            Field::AssemblyReservationStatus => &mut voter.assembly_reservation_status,
            Field::LokSabhaConstituencyNumber => &mut voter.lok_sabha_constituency_number,
            Field::LokSabhaConstituencyName => &mut voter.lok_sabha_constituency_name,
            Field::LokSabhaReservationStatus => &mut voter.lok_sabha_reservation_status,
            Field::Hometown => &mut voter.hometown,
            Field::PoliceStation => &mut voter.police_station,
            Field::Taluka => &mut voter.taluka,
            Field::District => &mut voter.district,
            Field::PinCode => &mut voter.pin_code,
        };
        *target = value.to_string();
    }
}

/// Header labels in export order.
pub fn header_labels() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.label()).collect()
}

// Leading digits only, like a lenient integer parse: "42 years" is 42.
fn parse_age(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().unwrap_or(0)
}
