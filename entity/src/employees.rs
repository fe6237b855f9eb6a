use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::RecordId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown gender `{s}` (expected Male or Female)"))
    }
}

/// States offered by the employee form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Maharashtra,
    Delhi,
    Karnataka,
    #[serde(rename = "Tamil Nadu")]
    TamilNadu,
}

impl State {
    pub const ALL: [State; 4] = [
        State::Maharashtra,
        State::Delhi,
        State::Karnataka,
        State::TamilNadu,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Maharashtra => "Maharashtra",
            State::Delhi => "Delhi",
            State::Karnataka => "Karnataka",
            State::TamilNadu => "Tamil Nadu",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        State::ALL
            .into_iter()
            .find(|state| {
                let name: String = state
                    .as_str()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect();
                name.eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| {
                format!("unknown state `{s}` (expected Maharashtra, Delhi, Karnataka or Tamil Nadu)")
            })
    }
}

/// Everything about an employee except the store-assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub full_name: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub state: State,
    pub active: bool,
    /// `data:` URI of the profile picture.
    #[serde(default, with = "image_field")]
    pub image: Option<String>,
}

/// Document in the `employees` collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: RecordId,
    #[serde(flatten)]
    pub profile: EmployeeProfile,
}

impl Employee {
    pub fn new(id: RecordId, profile: EmployeeProfile) -> Self {
        Self { id, profile }
    }
}

/// Partial update body for `PATCH /employees/:id`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub active: bool,
}

// Stored documents use "" for "no picture".
mod image_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|value| !value.is_empty()))
    }
}
