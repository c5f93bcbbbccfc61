//! Turns three image analyses into one generation prompt.

use std::fmt;

use crate::model::{CompositionAnalysis, ImageAnalysis};

/// Label fragments that mark a clothing label.
const CLOTHING_TERMS: &[&str] =
    &["clothing", "shirt", "dress", "jacket", "pants", "fashion", "apparel"];

/// Label fragments that mark a setting label.
const PLACE_TERMS: &[&str] =
    &["outdoor", "indoor", "beach", "city", "nature", "building", "landscape", "scenery"];

/// Matched labels beyond this count are left out of a clause.
const MAX_CLAUSE_LABELS: usize = 3;

const STYLE_SUFFIX: &str = "photorealistic, professional photography, natural lighting, \
                            sharp focus, high detail, well-balanced composition";

/// The text prompt sent to the generative backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    /// The prompt text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the prompt, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the prompt for a person, clothing and place analysis.
///
/// Pure and deterministic: labels are taken in the order the analyzer kept
/// them, never re-sorted.
#[must_use]
pub fn synthesize(analysis: &CompositionAnalysis) -> GenerationPrompt {
    GenerationPrompt(format!(
        "{} {} {}, {STYLE_SUFFIX}",
        person_clause(&analysis.person),
        clothing_clause(&analysis.clothing),
        place_clause(&analysis.place),
    ))
}

fn person_clause(person: &ImageAnalysis) -> String {
    let Some(demo) = &person.demographics else {
        return "a person".to_string();
    };
    let subject = demo.gender.as_deref().unwrap_or("person");
    let mut clause = format!("a {}-year-old {subject}", demo.age_range.midpoint());
    if let Some(emotion) = demo.top_emotions.first() {
        clause.push_str(&format!(" with {emotion} expression"));
    }
    clause
}

fn clothing_clause(clothing: &ImageAnalysis) -> String {
    let matched = matching_labels(&clothing.labels, CLOTHING_TERMS);
    if matched.is_empty() {
        "wearing fashionable clothing".to_string()
    } else {
        format!("wearing {}", matched.join(", "))
    }
}

fn place_clause(place: &ImageAnalysis) -> String {
    let matched = matching_labels(&place.labels, PLACE_TERMS);
    if matched.is_empty() {
        "in a beautiful location".to_string()
    } else {
        format!("in a {} setting", matched.join(", "))
    }
}

fn matching_labels<'a>(labels: &'a [String], terms: &[&str]) -> Vec<&'a str> {
    labels
        .iter()
        .filter(|label| terms.iter().any(|term| label.contains(term)))
        .take(MAX_CLAUSE_LABELS)
        .map(String::as_str)
        .collect()
}
