//! Device selection form
//!
//! The single input surface of the analysis: a required multi-select of
//! devices. Choices come from a [`DeviceChoiceSource`], so the form never
//! touches a store directly.

use crate::graph::{Selection, Topology};
use crate::store::{Device, DeviceId};
use std::collections::BTreeMap;
use std::fmt;

/// Supplies the devices a multi-select field may offer.
pub trait DeviceChoiceSource {
  /// Devices matching `query`, ordered by id. Empty query means all.
  fn choices(&self, query: &str) -> Vec<&Device>;

  /// Whether `id` is a selectable device
  fn is_choice(&self, id: DeviceId) -> bool;
}

impl DeviceChoiceSource for Topology {
  fn choices(&self, query: &str) -> Vec<&Device> {
    self.search_devices(query)
  }

  fn is_choice(&self, id: DeviceId) -> bool {
    self.contains_device(id)
  }
}

/// Why one field rejected its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
  /// Field is required and nothing was selected
  Required,
  /// Token is not a device id
  Invalid { value: String },
  /// Id does not name a selectable device
  UnknownDevice { id: DeviceId },
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldError::Required => write!(f, "This field is required."),
      FieldError::Invalid { value } => write!(f, "'{}' is not a valid device id.", value),
      FieldError::UnknownDevice { id } => {
        write!(f, "Select a valid choice. {} is not one of the available choices.", id)
      }
    }
  }
}

/// All errors of a form submission, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
  fields: BTreeMap<String, Vec<FieldError>>,
}

impl FormErrors {
  pub fn required(field: &str) -> Self {
    let mut errors = Self::default();
    errors.add(field, FieldError::Required);
    errors
  }

  pub fn add(&mut self, field: &str, error: FieldError) {
    self.fields.entry(field.to_string()).or_default().push(error);
  }

  #[cfg(test)]
  pub fn field(&self, name: &str) -> &[FieldError] {
    self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
  }
}

impl fmt::Display for FormErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, errors) in &self.fields {
      for error in errors {
        if !first {
          writeln!(f)?;
        }
        write!(f, "  {}: {}", field, error)?;
        first = false;
      }
    }
    Ok(())
  }
}

/// Multi-select field whose choices are resolved at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicMultipleChoiceField {
  pub name: &'static str,
  pub label: &'static str,
  pub help_text: &'static str,
  pub required: bool,
}

impl DynamicMultipleChoiceField {
  /// Parse and check raw submitted values.
  ///
  /// Each value may carry several comma-separated ids ("1, 2,3"). Blank
  /// tokens are skipped. Every bad token is reported, not just the first.
  pub fn clean(&self, raw: &[String], source: &dyn DeviceChoiceSource) -> Result<Vec<DeviceId>, Vec<FieldError>> {
    let mut ids = Vec::new();
    let mut errors = Vec::new();

    for token in raw.iter().flat_map(|value| value.split(',')).map(str::trim) {
      if token.is_empty() {
        continue;
      }
      match token.parse::<DeviceId>() {
        Ok(id) if source.is_choice(id) => ids.push(id),
        Ok(id) => errors.push(FieldError::UnknownDevice { id }),
        Err(_) => errors.push(FieldError::Invalid {
          value: token.to_string(),
        }),
      }
    }

    if ids.is_empty() && errors.is_empty() && self.required {
      errors.push(FieldError::Required);
    }

    if errors.is_empty() { Ok(ids) } else { Err(errors) }
  }
}

/// Form for choosing the devices to analyze.
pub struct DeviceImpactAnalysisForm<'a> {
  pub devices: DynamicMultipleChoiceField,
  source: &'a dyn DeviceChoiceSource,
}

impl<'a> DeviceImpactAnalysisForm<'a> {
  pub fn new(source: &'a dyn DeviceChoiceSource) -> Self {
    Self {
      devices: DynamicMultipleChoiceField {
        name: "devices",
        label: "Select Devices",
        help_text: "Select one or more devices to analyze for circuit impact.",
        required: true,
      },
      source,
    }
  }

  /// Devices the `devices` field offers for `query`.
  pub fn choices(&self, query: &str) -> Vec<&'a Device> {
    self.source.choices(query)
  }

  /// Validate a submission into a [`Selection`].
  pub fn validate(&self, raw: &[String]) -> Result<Selection, FormErrors> {
    let mut errors = FormErrors::default();

    match self.devices.clean(raw, self.source) {
      Ok(ids) => match Selection::new(ids) {
        Ok(selection) => return Ok(selection),
        Err(_) => errors.add(self.devices.name, FieldError::Required),
      },
      Err(field_errors) => {
        for error in field_errors {
          errors.add(self.devices.name, error);
        }
      }
    }

    tracing::debug!(errors = %errors, "device selection rejected");
    Err(errors)
  }
}
