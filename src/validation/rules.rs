use chrono::{Datelike, Utc};
use serde_json::Value;

use super::{Check, RuleSet};
use crate::types::Material;

pub const EARLIEST_YEAR: i64 = 2000;
const VERIFICATION_STATES: &[&str] = &["verified", "notVerified"];

/// Constraints shared by creation and the stored document.
fn descriptive_fields(name: &'static str) -> RuleSet {
    let current_year = i64::from(Utc::now().year());

    RuleSet::new(name)
        .rule("subject", Check::Length { min: 2, max: 100 }, "Subject must be between 2 and 100 characters")
        .rule("semester", Check::IntRange { min: 1, max: 8 }, "Semester must be between 1 and 8")
        .rule("instructorName", Check::NonEmptyArray, "At least one instructor name is required")
        .rule(
            "instructorName",
            Check::EachLength { min: 2, max: 50 },
            "Instructor name must be between 2 and 50 characters",
        )
        .rule("materialLink", Check::Url, "Material link must be a valid URL")
        .optional("desc", Check::Length { min: 0, max: 500 }, "Description cannot exceed 500 characters")
        .rule("author", Check::NonEmptyArray, "At least one author is required")
        .rule("author", Check::EachLength { min: 2, max: 50 }, "Author name must be between 2 and 50 characters")
        .rule("yearOfWriting", Check::IntRange { min: EARLIEST_YEAR, max: current_year }, "Year must be valid")
        .rule("branch", Check::NonEmptyArray, "At least one branch is required")
        .rule("branch", Check::EachNonBlank, "Branch must be a non-empty string")
        .rule("materialType", Check::Length { min: 2, max: 50 }, "Material type is required")
}

pub fn create_material() -> RuleSet {
    descriptive_fields("create_material")
        .rule("thumbnail", Check::DriveLink, "Thumbnail must be a valid Google Drive URL")
        .optional(
            "verifiedBy",
            Check::OneOf(VERIFICATION_STATES),
            "verifiedBy must be either verified or notVerified",
        )
}

pub fn update_material() -> RuleSet {
    create_material().partial("update_material")
}

pub fn material_id() -> RuleSet {
    RuleSet::new("material_id").rule("id", Check::ObjectId, "Invalid material ID")
}

pub fn material_type() -> RuleSet {
    RuleSet::new("material_type").rule("materialType", Check::Length { min: 2, max: 50 }, "Invalid material type")
}

pub fn upvote() -> RuleSet {
    RuleSet::new("upvote")
        .rule("materialId", Check::ObjectId, "Invalid material ID")
        .rule("email", Check::Email, "Please provide a valid email")
}

/// Re-checks a whole stored document, e.g. after a partial update has been merged in.
/// Returns the first violated constraint's message.
pub fn check_document(material: &Material) -> std::result::Result<(), String> {
    let document = match serde_json::to_value(material) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err("Material must serialize to an object".to_string()),
        Err(e) => return Err(e.to_string()),
    };

    let rules = descriptive_fields("document").rule("thumbnail", Check::Url, "Thumbnail must be a valid URL");
    match rules.first_failure(&document) {
        Some(rule) => Err(rule.message.to_string()),
        None => Ok(()),
    }
}
