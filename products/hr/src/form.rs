//! Employee form: required-field checks and picture encoding.
//!
//! Validation runs before any request is built; a draft that fails never reaches
//! the record store.

use std::{fmt, fs, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use entity::{EmployeeProfile, Gender, State};

use crate::{HrError, HrResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    FullName,
    Gender,
    Dob,
    State,
    Image,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::FullName => "fullName",
            Field::Gender => "gender",
            Field::Dob => "dob",
            Field::State => "state",
            Field::Image => "image",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every failing field of one submission, in form order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: Field, message: &'static str) -> Self {
        Self {
            errors: vec![FieldError { field, message }],
        }
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.errors.iter().map(|err| err.message).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// What to do with the picture on submit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageInput {
    #[default]
    Unchanged,
    Replace(String),
    Remove,
}

/// Raw form values. `None` means the field was left empty (add) or not touched (edit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub full_name: Option<String>,
    pub gender: Option<Gender>,
    /// As typed; must be `YYYY-MM-DD`.
    pub dob: Option<String>,
    pub state: Option<State>,
    pub active: Option<bool>,
    pub image: ImageInput,
}

impl EmployeeDraft {
    /// Validates a brand-new employee. Status defaults to active.
    pub fn into_profile(self) -> Result<EmployeeProfile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let full_name = self
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if full_name.is_none() {
            errors.push(Field::FullName, "Full name is required");
        }
        if self.gender.is_none() {
            errors.push(Field::Gender, "Gender is required");
        }
        let dob = parse_dob(self.dob.as_deref(), &mut errors);
        if self.state.is_none() {
            errors.push(Field::State, "State is required");
        }

        match (full_name, self.gender, dob, self.state) {
            (Some(full_name), Some(gender), Some(dob), Some(state)) if errors.is_empty() => {
                Ok(EmployeeProfile {
                    full_name,
                    gender,
                    dob,
                    state,
                    active: self.active.unwrap_or(true),
                    image: match self.image {
                        ImageInput::Replace(uri) => Some(uri),
                        ImageInput::Unchanged | ImageInput::Remove => None,
                    },
                })
            }
            _ => Err(errors),
        }
    }

    /// Layers the touched fields over an existing record, then validates the result.
    pub fn apply_to(self, current: &EmployeeProfile) -> Result<EmployeeProfile, ValidationErrors> {
        let merged = EmployeeDraft {
            full_name: Some(self.full_name.unwrap_or_else(|| current.full_name.clone())),
            gender: self.gender.or(Some(current.gender)),
            dob: Some(
                self.dob
                    .unwrap_or_else(|| current.dob.format("%Y-%m-%d").to_string()),
            ),
            state: self.state.or(Some(current.state)),
            active: Some(self.active.unwrap_or(current.active)),
            image: match self.image {
                ImageInput::Unchanged => current
                    .image
                    .clone()
                    .map_or(ImageInput::Remove, ImageInput::Replace),
                other => other,
            },
        };
        merged.into_profile()
    }
}

fn parse_dob(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty());
    let Some(raw) = raw else {
        errors.push(Field::Dob, "Date of birth is required");
        return None;
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(Field::Dob, "Date of birth must be YYYY-MM-DD");
            None
        }
    }
}

/// Picture types the form accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }
}

pub fn data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

/// Reads a picture from disk into a `data:` URI.
pub fn load_image(path: &Path) -> HrResult<String> {
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        ValidationErrors::single(Field::Image, "Image must be a PNG, JPEG or WEBP file")
    })?;
    let bytes = fs::read(path).map_err(|source| HrError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data_uri(format, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> EmployeeDraft {
        EmployeeDraft {
            full_name: Some("  Anu Sharma ".into()),
            gender: Some(Gender::Female),
            dob: Some("1994-03-21".into()),
            state: Some(State::Maharashtra),
            active: None,
            image: ImageInput::Unchanged,
        }
    }

    #[test]
    fn complete_draft_becomes_active_profile() {
        let profile = complete().into_profile().unwrap();
        assert_eq!(profile.full_name, "Anu Sharma");
        assert!(profile.active);
        assert_eq!(profile.image, None);
        assert_eq!(profile.dob, NaiveDate::from_ymd_opt(1994, 3, 21).unwrap());
    }

    #[test]
    fn reports_every_missing_field_at_once() {
        let errors = EmployeeDraft {
            full_name: Some("   ".into()),
            ..EmployeeDraft::default()
        }
        .into_profile()
        .unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::FullName, Field::Gender, Field::Dob, Field::State]);
        assert_eq!(errors.message_for(Field::FullName), Some("Full name is required"));
        assert_eq!(
            errors.to_string(),
            "Full name is required; Gender is required; Date of birth is required; State is required"
        );
    }

    #[test]
    fn malformed_dob_is_a_field_error() {
        let errors = EmployeeDraft {
            dob: Some("21/03/1994".into()),
            ..complete()
        }
        .into_profile()
        .unwrap_err();
        assert_eq!(errors.message_for(Field::Dob), Some("Date of birth must be YYYY-MM-DD"));
    }

    #[test]
    fn edit_keeps_untouched_fields() {
        let current = EmployeeDraft {
            image: ImageInput::Replace("data:image/png;base64,AAAA".into()),
            active: Some(false),
            ..complete()
        }
        .into_profile()
        .unwrap();

        let edited = EmployeeDraft {
            state: Some(State::Delhi),
            ..EmployeeDraft::default()
        }
        .apply_to(&current)
        .unwrap();
        assert_eq!(edited.state, State::Delhi);
        assert_eq!(edited.full_name, current.full_name);
        assert_eq!(edited.dob, current.dob);
        assert!(!edited.active);
        assert_eq!(edited.image, current.image);

        let cleared = EmployeeDraft {
            image: ImageInput::Remove,
            ..EmployeeDraft::default()
        }
        .apply_to(&current)
        .unwrap();
        assert_eq!(cleared.image, None);
    }

    #[test]
    fn edit_cannot_blank_the_name() {
        let current = complete().into_profile().unwrap();
        let errors = EmployeeDraft {
            full_name: Some(String::new()),
            ..EmployeeDraft::default()
        }
        .apply_to(&current)
        .unwrap_err();
        assert_eq!(errors.message_for(Field::FullName), Some("Full name is required"));
    }

    #[test]
    fn pictures_become_data_uris() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.JPG");
        fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();
        assert_eq!(load_image(&path).unwrap(), "data:image/jpeg;base64,/9j/");

        let gif = dir.path().join("face.gif");
        fs::write(&gif, b"GIF89a").unwrap();
        let err = load_image(&gif).unwrap_err();
        assert!(matches!(err, HrError::Validation(_)), "{err}");

        let missing = dir.path().join("missing.png");
        assert!(matches!(load_image(&missing), Err(HrError::Image { .. })));
    }
}
