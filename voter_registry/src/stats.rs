use serde::Serialize;

use crate::config::Voter;

/// The headline figures of the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_voters: usize,
    pub male_voters: usize,
    pub female_voters: usize,
    /// Rounded to the nearest year, 0 when there are no voters.
    pub average_age: u32,
}

impl RegistryStats {
    pub fn compute(voters: &[Voter]) -> RegistryStats {
        let count_gender = |g: &str| voters.iter().filter(|v| v.gender == g).count();
        let total_age: u64 = voters.iter().map(|v| v.age as u64).sum();
        let average_age = if voters.is_empty() {
            0
        } else {
            (total_age as f64 / voters.len() as f64).round() as u32
        };
        RegistryStats {
            total_voters: voters.len(),
            male_voters: count_gender("Male"),
            female_voters: count_gender("Female"),
            average_age,
        }
    }
}
