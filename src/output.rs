//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Prepare
//!
//! ```text
//! 001 fridge.jpg
//!     4032x3024 → 1024x768
//!     Payload: 212 KiB
//! 002 broken.heic
//!     Failed: Image processing failed. Please try another photo.
//!
//! Prepared 1 of 2 images
//! ```
//!
//! ## Generate
//!
//! ```text
//! Recipes (served from cache)
//! 001 Tomato Soup
//!     Difficulty: easy, 15 min
//!     Ingredients: tomato, onion
//!     1. Chop
//!     2. Simmer
//! ```
//!
//! A failed request prints a single `Error:` line instead.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generator::GeneratorState;
use crate::imaging::{ImageError, NormalizedImage};
use crate::types::Recipe;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_kib(bytes: usize) -> String {
    format!("{} KiB", bytes.div_ceil(1024))
}

// ============================================================================
// prepare
// ============================================================================

/// Outcome of preparing one file, as shown by `dish-go prepare`.
pub struct PrepareEntry<'a> {
    pub name: &'a str,
    pub outcome: &'a Result<NormalizedImage, ImageError>,
}

/// Format per-file normalize results followed by a summary line.
pub fn format_prepare_output(entries: &[PrepareEntry<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut ok = 0;

    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        match entry.outcome {
            Ok(image) => {
                ok += 1;
                let (ow, oh) = image.original;
                lines.push(format!(
                    "{}{}x{} → {}x{}",
                    indent(1),
                    ow,
                    oh,
                    image.width,
                    image.height
                ));
                lines.push(format!("{}Payload: {}", indent(1), format_kib(image.base64.len())));
            }
            Err(e) => lines.push(format!("{}Failed: {}", indent(1), e.user_message())),
        }
    }

    lines.push(String::new());
    lines.push(format!("Prepared {} of {} images", ok, entries.len()));
    lines
}

pub fn print_prepare_output(entries: &[PrepareEntry<'_>]) {
    for line in format_prepare_output(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// generate
// ============================================================================

/// Format one recipe card. Steps keep the service's numbering when present
/// and fall back to their position.
fn format_recipe(index: usize, recipe: &Recipe) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", format_index(index), recipe.title),
        format!(
            "{}Difficulty: {}, {} min",
            indent(1),
            recipe.difficulty,
            recipe.cooking_time
        ),
    ];
    if !recipe.ingredients.is_empty() {
        lines.push(format!(
            "{}Ingredients: {}",
            indent(1),
            recipe.ingredients.join(", ")
        ));
    }
    for (pos, step) in recipe.steps().iter().enumerate() {
        let number = step.number.map_or(pos + 1, |n| n as usize);
        lines.push(format!("{}{}. {}", indent(1), number, step.text));
    }
    lines
}

/// Format the generator state after a request has settled.
pub fn format_generate_output(state: &GeneratorState) -> Vec<String> {
    if let Some(error) = &state.error {
        return vec![format!("Error: {}", error)];
    }
    if state.recipes.is_empty() {
        return vec!["No recipes returned".to_string()];
    }

    let mut lines = vec![if state.cached {
        "Recipes (served from cache)".to_string()
    } else {
        "Recipes".to_string()
    }];
    for (i, recipe) in state.recipes.iter().enumerate() {
        lines.extend(format_recipe(i + 1, recipe));
    }
    lines
}

pub fn print_generate_output(state: &GeneratorState) {
    for line in format_generate_output(state) {
        println!("{}", line);
    }
}
