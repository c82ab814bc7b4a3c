use crate::error::SearchError;
use crate::model::ManualInput;

/// Location label used when the coordinate came from the position
/// capability instead of geocoding.
pub const CURRENT_LOCATION_LABEL: &str = "My Current Location";

/// Raw field values for the input modalities.
///
/// Pure in-memory state: no network, no async. The active modality lives
/// in [`crate::store::ViewState`], so switching it never touches these
/// fields; values entered under one modality survive a switch to the
/// other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputForm {
    prompt_text: String,
    location_text: String,
    iso_date: String,
}

impl InputForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_prompt_text(&mut self, text: impl Into<String>) {
        self.prompt_text = text.into();
    }

    pub fn set_location_text(&mut self, text: impl Into<String>) {
        self.location_text = text.into();
    }

    pub fn set_date(&mut self, iso_date: impl Into<String>) {
        self.iso_date = iso_date.into();
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn location_text(&self) -> &str {
        &self.location_text
    }

    pub fn iso_date(&self) -> &str {
        &self.iso_date
    }

    /// Validate the prompt modality, returning the trimmed prompt.
    pub fn validate_prompt(&self) -> Result<String, SearchError> {
        let text = self.prompt_text.trim();
        if text.is_empty() {
            return Err(SearchError::validation("Please enter a prompt."));
        }
        Ok(text.to_string())
    }

    /// Validate the manual modality, returning its payload.
    pub fn validate_manual(&self) -> Result<ManualInput, SearchError> {
        let location = self.location_text.trim();
        let date = self.iso_date.trim();
        if location.is_empty() || date.is_empty() {
            return Err(SearchError::validation(
                "Please enter a location and select a date.",
            ));
        }
        Ok(ManualInput {
            location_text: location.to_string(),
            iso_date: date.to_string(),
        })
    }

    /// Whether the current-location action may run: it only needs a date.
    pub fn validate_date_selected(&self) -> Result<String, SearchError> {
        let date = self.iso_date.trim();
        if date.is_empty() {
            return Err(SearchError::validation("Please select a date first."));
        }
        Ok(date.to_string())
    }
}
