//! Request assembly for the upload form.
//!
//! The form collects free text, a chip list of ingredients, one photo and two
//! options. This module turns those inputs into a validated
//! [`CookingRequest`] with plain functions over a static struct, and tracks
//! the photo selection so a slow normalize for an old photo cannot overwrite
//! the current one.

use crate::imaging::{ImageError, NormalizedImage, SourceImage};
use crate::preview::{PreviewRegistry, PreviewSlot};
use crate::types::{CookingRequest, ValidationError};
use std::ops::RangeInclusive;

pub const DEFAULT_RECIPE_COUNT: u8 = 3;
pub const RECIPE_COUNT_RANGE: RangeInclusive<u8> = 1..=5;

/// Label placed before the chip list when it is folded into `text`.
pub const INGREDIENTS_LABEL: &str = "食材: ";

/// Ingredient chips, in the order the user added them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chip. Blank input and exact duplicates (after trimming) are
    /// ignored; returns whether the list changed.
    pub fn add(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || self.items.iter().any(|i| i == ingredient) {
            return false;
        }
        self.items.push(ingredient.to_string());
        true
    }

    pub fn remove(&mut self, ingredient: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != ingredient.trim());
        self.items.len() != before
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fold the chips and an optional free-text note into the request text.
    ///
    /// `None` when both are empty.
    pub fn compose_text(&self, note: &str) -> Option<String> {
        let note = note.trim();
        let chips = (!self.items.is_empty())
            .then(|| format!("{INGREDIENTS_LABEL}{}", self.items.join(", ")));
        match (chips, note.is_empty()) {
            (Some(chips), true) => Some(chips),
            (Some(chips), false) => Some(format!("{chips}\n{note}")),
            (None, false) => Some(note.to_string()),
            (None, true) => None,
        }
    }
}

fn field_error(path: &str, message: &str) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Check a request before it is sent. Every failing field is reported.
pub fn validate_request(request: &CookingRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let text = request.text.as_deref();
    let image = request.image.as_deref();
    if text.is_none() && image.is_none() {
        errors.push(field_error("text", "enter some text or choose a photo"));
    }
    if text.is_some_and(|t| t.trim().is_empty()) {
        errors.push(field_error("text", "must not be blank"));
    }
    if image.is_some_and(str::is_empty) {
        errors.push(field_error("image", "must not be empty"));
    }
    if request
        .recipe_count
        .is_some_and(|count| !RECIPE_COUNT_RANGE.contains(&count))
    {
        errors.push(field_error(
            "recipeCount",
            &format!(
                "must be between {} and {}",
                RECIPE_COUNT_RANGE.start(),
                RECIPE_COUNT_RANGE.end()
            ),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Build and validate a request from raw form values. Empty text and a
/// missing payload are left out of the request.
pub fn build_request(
    text: Option<String>,
    image: Option<&str>,
    recipe_count: u8,
    use_all_ingredients: bool,
) -> Result<CookingRequest, Vec<ValidationError>> {
    let request = CookingRequest {
        text: text.filter(|t| !t.trim().is_empty()),
        image: image.filter(|i| !i.is_empty()).map(str::to_string),
        recipe_count: Some(recipe_count),
        use_all_ingredients: Some(use_all_ingredients),
    };
    validate_request(&request)?;
    Ok(request)
}

/// Identifies one photo selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket(u64);

/// The photo currently chosen in the form: its preview and, once ready,
/// its upload payload.
#[derive(Debug, Default)]
pub struct ImageSelection {
    generation: u64,
    preview: PreviewSlot,
    payload: Option<NormalizedImage>,
}

impl ImageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection: show its preview immediately and drop any
    /// payload from the previous photo.
    pub fn select(&mut self, registry: &PreviewRegistry, source: &SourceImage) -> SelectionTicket {
        self.generation += 1;
        self.preview.replace(registry.create(source));
        self.payload = None;
        SelectionTicket(self.generation)
    }

    /// Record the normalize outcome for `ticket`.
    ///
    /// Returns `Ok(false)` when a newer selection has been made since; the
    /// outcome is then ignored, errors included.
    pub fn complete(
        &mut self,
        ticket: SelectionTicket,
        outcome: Result<NormalizedImage, ImageError>,
    ) -> Result<bool, ImageError> {
        if ticket.0 != self.generation {
            tracing::debug!(stale = ticket.0, current = self.generation, "ignoring superseded image");
            return Ok(false);
        }
        self.payload = Some(outcome?);
        Ok(true)
    }

    /// Base64 payload for the request, once normalize has finished.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_ref().map(|p| p.base64.as_str())
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.url()
    }

    /// Forget the photo and revoke its preview.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.preview.clear();
        self.payload = None;
    }
}
