use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use crate::config::{Voter, VoterPatch};
use crate::schema::{Field, REQUIRED_FIELDS};

/// A builder for the add and edit forms.
///
/// Values are kept as typed by the user and checked all at once by
/// [VoterBuilder::validate].
///
/// ```
/// use voter_registry::builder::VoterBuilder;
/// use voter_registry::schema::Field;
///
/// let patch = VoterBuilder::new()
///     .voter_id("MH0000123")
///     .full_name("Jane Doe")
///     .gender("Female")
///     .age("34")
///     .field(Field::District, "Pune")
///     .validate()?;
///
/// assert_eq!(patch.age, Some(34));
/// # Ok::<(), voter_registry::builder::ValidationErrors>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoterBuilder {
    values: BTreeMap<usize, (Field, String)>,
}

/// All the problems found in a form, in column order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ValidationErrors {
    pub errors: Vec<(Field, String)>,
}

impl ValidationErrors {
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }
}

impl Error for ValidationErrors {}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|(_, m)| m.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn position(field: Field) -> usize {
    Field::ALL.iter().position(|f| *f == field).unwrap_or(0)
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

impl VoterBuilder {
    pub fn new() -> VoterBuilder {
        VoterBuilder::default()
    }

    /// A form prefilled with an existing record, for editing.
    pub fn from_voter(voter: &Voter) -> VoterBuilder {
        Field::ALL
            .iter()
            .filter(|f| **f != Field::SerialNumber)
            .fold(VoterBuilder::new(), |b, f| b.field(*f, &f.value(voter, 0)))
    }

    /// Sets the value of a column. The serial number cannot be set.
    pub fn field(mut self, field: Field, value: &str) -> VoterBuilder {
        if field != Field::SerialNumber {
            self.values
                .insert(position(field), (field, value.trim().to_string()));
        }
        self
    }

    pub fn voter_id(self, value: &str) -> VoterBuilder {
        self.field(Field::VoterId, value)
    }

    pub fn full_name(self, value: &str) -> VoterBuilder {
        self.field(Field::FullName, value)
    }

    pub fn gender(self, value: &str) -> VoterBuilder {
        self.field(Field::Gender, value)
    }

    pub fn age(self, value: &str) -> VoterBuilder {
        self.field(Field::Age, value)
    }

    pub fn mobile_number(self, value: &str) -> VoterBuilder {
        self.field(Field::MobileNumber, value)
    }

    pub fn pin_code(self, value: &str) -> VoterBuilder {
        self.field(Field::PinCode, value)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&position(field)).map(|(_, v)| v.as_str())
    }

    /// Checks the form and turns it into a patch holding the supplied fields.
    ///
    /// Voter id, full name and gender are required. When given, the age
    /// must be between 18 and 120, the mobile number 10 digits and the pin
    /// code 6 digits.
    pub fn validate(&self) -> Result<VoterPatch, ValidationErrors> {
        let mut errors: Vec<(Field, String)> = Vec::new();
        for f in REQUIRED_FIELDS {
            if self.get(f).map_or(true, |v| v.is_empty()) {
                errors.push((f, format!("{} is required", f.label())));
            }
        }

        let mut age: Option<u32> = None;
        if let Some(a) = self.get(Field::Age) {
            if a.is_empty() {
                age = Some(0);
            } else {
                match a.parse::<u32>() {
                    Ok(x) if (18..=120).contains(&x) => age = Some(x),
                    _ => errors.push((Field::Age, "Age must be between 18 and 120".to_string())),
                }
            }
        }
        match self.get(Field::MobileNumber) {
            Some(m) if !m.is_empty() && !all_digits(m, 10) => errors.push((
                Field::MobileNumber,
                "Mobile number must be 10 digits".to_string(),
            )),
            _ => {}
        }
        match self.get(Field::PinCode) {
            Some(p) if !p.is_empty() && !all_digits(p, 6) => {
                errors.push((Field::PinCode, "Pin code must be 6 digits".to_string()))
            }
            _ => {}
        }

        if !errors.is_empty() {
            errors.sort_by_key(|(f, _)| position(*f));
            return Err(ValidationErrors { errors });
        }

        let mut patch = VoterPatch {
            age,
            ..VoterPatch::default()
        };
        for (field, value) in self.values.values() {
            if let Some(slot) = text_slot(&mut patch, *field) {
                *slot = Some(value.clone());
            }
        }
        Ok(patch)
    }
}

fn text_slot(patch: &mut VoterPatch, field: Field) -> Option<&mut Option<String>> {
    let slot = match field {
        Field::SerialNumber | Field::Age => return None,
        Field::VoterId => &mut patch.voter_id,
        Field::FullName => &mut patch.full_name,
        Field::FirstName => &mut patch.first_name,
        Field::LastName => &mut patch.last_name,
        Field::RelativeName => &mut patch.relative_name,
        Field::HouseNo => &mut patch.house_no,
        Field::AddressLine1 => &mut patch.address_line1,
        Field::AddressLine2 => &mut patch.address_line2,
        Field::Gender => &mut patch.gender,
        Field::MobileNumber => &mut patch.mobile_number,
        Field::Caste => &mut patch.caste,
        Field::SectionDetails => &mut patch.section_details,
        Field::YadiNumber => &mut patch.yadi_number,
        Field::AssemblyConstituencyNumber => &mut patch.assembly_constituency_number,
        Field::AssemblyConstituencyName => &mut patch.assembly_constituency_name,
        Field::AssemblyReservationStatus => &mut patch.assembly_reservation_status,
        Field::LokSabhaConstituencyNumber => &mut patch.lok_sabha_constituency_number,
        Field::LokSabhaConstituencyName => &mut patch.lok_sabha_constituency_name,
        Field::LokSabhaReservationStatus => &mut patch.lok_sabha_reservation_status,
        Field::Hometown => &mut patch.hometown,
        Field::PoliceStation => &mut patch.police_station,
        Field::Taluka => &mut patch.taluka,
        Field::District => &mut patch.district,
        Field::PinCode => &mut patch.pin_code,
    };
    Some(slot)
}
