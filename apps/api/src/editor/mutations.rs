//! The only sanctioned way to change document content.
//!
//! Every operation takes the current document, returns the next one, and on
//! success pushes the result into the history. Bad indexes, unknown paths,
//! ill-typed values and writes of a field's current value are no-ops: the
//! input comes back unchanged and nothing is pushed.

use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::editor::history::History;
use crate::models::resume::{new_entry, Entry, PersonalInfo, ResumeDocument, Section};

// ────────────────────────────────────────────────────────────────────────────
// Scalar field paths
// ────────────────────────────────────────────────────────────────────────────

/// Scalar fields addressable by `set_scalar_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Summary,
    Name,
    Title,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Portfolio,
}

impl FromStr for ScalarField {
    type Err = ();

    /// Accepts `summary` or `personalInfo.<field>`.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path == "summary" {
            return Ok(ScalarField::Summary);
        }
        let (section, field) = path.split_once('.').ok_or(())?;
        if section != "personalInfo" {
            return Err(());
        }
        match field {
            "name" => Ok(ScalarField::Name),
            "title" => Ok(ScalarField::Title),
            "email" => Ok(ScalarField::Email),
            "phone" => Ok(ScalarField::Phone),
            "location" => Ok(ScalarField::Location),
            "linkedin" => Ok(ScalarField::Linkedin),
            "github" => Ok(ScalarField::Github),
            "portfolio" => Ok(ScalarField::Portfolio),
            _ => Err(()),
        }
    }
}

fn scalar_slot<'a>(doc: &'a mut ResumeDocument, field: ScalarField) -> &'a mut String {
    let PersonalInfo {
        name,
        title,
        email,
        phone,
        location,
        linkedin,
        github,
        portfolio,
    } = &mut doc.personal_info;
    match field {
        ScalarField::Summary => &mut doc.summary,
        ScalarField::Name => name,
        ScalarField::Title => title,
        ScalarField::Email => email,
        ScalarField::Phone => phone,
        ScalarField::Location => location,
        ScalarField::Linkedin => linkedin,
        ScalarField::Github => github,
        ScalarField::Portfolio => portfolio,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Replaces `summary` or a `personalInfo.<field>` value.
pub fn set_scalar_field(
    history: &mut History,
    doc: &ResumeDocument,
    path: &str,
    value: &str,
) -> ResumeDocument {
    let Ok(field) = path.parse::<ScalarField>() else {
        debug!("Ignoring update to unknown field path '{path}'");
        return doc.clone();
    };
    let mut next = doc.clone();
    let slot = scalar_slot(&mut next, field);
    if slot.as_str() == value {
        return next;
    }
    *slot = value.to_string();
    history.push(next.clone());
    next
}

/// Replaces one field of the entry at `index` in `section`.
pub fn set_entry_field(
    history: &mut History,
    doc: &ResumeDocument,
    section: Section,
    index: usize,
    field: &str,
    value: Value,
) -> ResumeDocument {
    let mut next = doc.clone();
    let applied = match section {
        Section::Experience => patch_entry(&mut next.experience, index, field, value),
        Section::Education => patch_entry(&mut next.education, index, field, value),
        Section::Skills => patch_entry(&mut next.skills, index, field, value),
        Section::Projects => patch_entry(&mut next.projects, index, field, value),
        Section::Certifications => patch_entry(&mut next.certifications, index, field, value),
        Section::Languages => patch_entry(&mut next.languages, index, field, value),
    };
    if !applied {
        debug!("Ignoring update to {section}[{index}].{field}");
        return doc.clone();
    }
    if next == *doc {
        return next;
    }
    history.push(next.clone());
    next
}

/// Appends a fresh entry to the end of `section`.
pub fn add_entry(history: &mut History, doc: &ResumeDocument, section: Section) -> ResumeDocument {
    let mut next = doc.clone();
    next.push_entry(new_entry(section));
    history.push(next.clone());
    next
}

/// Removes the entry at `index`; later entries shift down by one.
pub fn remove_entry(
    history: &mut History,
    doc: &ResumeDocument,
    section: Section,
    index: usize,
) -> ResumeDocument {
    let mut next = doc.clone();
    let removed = match section {
        Section::Experience => remove_at(&mut next.experience, index),
        Section::Education => remove_at(&mut next.education, index),
        Section::Skills => remove_at(&mut next.skills, index),
        Section::Projects => remove_at(&mut next.projects, index),
        Section::Certifications => remove_at(&mut next.certifications, index),
        Section::Languages => remove_at(&mut next.languages, index),
    };
    if !removed {
        debug!("Ignoring removal of {section}[{index}]");
        return doc.clone();
    }
    history.push(next.clone());
    next
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Patches `field` through the entry's JSON form so the wire name and the
/// value's type are both checked by serde. The id is never patchable.
fn patch_entry<E: Entry>(entries: &mut [E], index: usize, field: &str, value: Value) -> bool {
    if field == "id" {
        return false;
    }
    let Some(entry) = entries.get_mut(index) else {
        return false;
    };
    let Ok(Value::Object(mut object)) = serde_json::to_value(&*entry) else {
        return false;
    };
    let Some(slot) = object.get_mut(field) else {
        return false;
    };
    *slot = value;
    match serde_json::from_value::<E>(Value::Object(object)) {
        Ok(patched) if patched.is_valid() => {
            *entry = patched;
            true
        }
        _ => false,
    }
}

fn remove_at<E>(entries: &mut Vec<E>, index: usize) -> bool {
    if index >= entries.len() {
        return false;
    }
    entries.remove(index);
    true
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::resume::{empty_document, LanguageProficiency, SKILL_LEVEL_DEFAULT};

    fn fresh() -> (History, ResumeDocument) {
        let doc = empty_document();
        (History::new(doc.clone(), None), doc)
    }

    fn with_two_jobs() -> (History, ResumeDocument) {
        let (mut history, doc) = fresh();
        let doc = add_entry(&mut history, &doc, Section::Experience);
        let doc = add_entry(&mut history, &doc, Section::Experience);
        (history, doc)
    }

    #[test]
    fn test_set_scalar_field_personal_info() {
        let (mut history, doc) = fresh();
        let next = set_scalar_field(&mut history, &doc, "personalInfo.email", "a@b.co");
        assert_eq!(next.personal_info.email, "a@b.co");
        assert_eq!(doc.personal_info.email, "", "input must not be mutated");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &next);
    }

    #[test]
    fn test_set_scalar_field_summary() {
        let (mut history, doc) = fresh();
        let next = set_scalar_field(&mut history, &doc, "summary", "Builds things.");
        assert_eq!(next.summary, "Builds things.");
    }

    #[test]
    fn test_unknown_path_is_noop() {
        let (mut history, doc) = fresh();
        for path in ["personalInfo.age", "hobbies", "experience.title", ""] {
            let next = set_scalar_field(&mut history, &doc, path, "x");
            assert_eq!(next, doc);
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_out_of_range_entry_update_is_noop() {
        let (mut history, doc) = with_two_jobs();
        let before = history.len();
        let next = set_entry_field(&mut history, &doc, Section::Experience, 99, "title", json!("X"));
        assert_eq!(next, doc);
        assert_eq!(history.len(), before);
    }

    #[test]
    fn test_writing_current_value_does_not_push() {
        let (mut history, doc) = with_two_jobs();
        let doc = set_scalar_field(&mut history, &doc, "personalInfo.name", "Ada");
        let before = history.len();

        let next = set_scalar_field(&mut history, &doc, "personalInfo.name", "Ada");
        assert_eq!(next, doc);
        let next = set_entry_field(&mut history, &next, Section::Experience, 0, "current", json!(false));
        assert_eq!(next, doc);
        assert_eq!(history.len(), before);
    }

    #[test]
    fn test_set_entry_field_updates_only_target() {
        let (mut history, doc) = with_two_jobs();
        let next = set_entry_field(
            &mut history,
            &doc,
            Section::Experience,
            1,
            "title",
            json!("Engineer"),
        );
        assert_eq!(next.experience[1].title, "Engineer");
        assert_eq!(next.experience[0].title, "");
        assert_eq!(next.experience[1].id, doc.experience[1].id);
    }

    #[test]
    fn test_set_entry_field_typed_values() {
        let (mut history, doc) = with_two_jobs();
        let next = set_entry_field(&mut history, &doc, Section::Experience, 0, "current", json!(true));
        assert!(next.experience[0].current);

        let doc = add_entry(&mut history, &next, Section::Languages);
        let next = set_entry_field(
            &mut history,
            &doc,
            Section::Languages,
            0,
            "proficiency",
            json!("Fluent"),
        );
        assert_eq!(next.languages[0].proficiency, LanguageProficiency::Fluent);
    }

    #[test]
    fn test_set_entry_field_rejects_bad_type_unknown_field_and_id() {
        let (mut history, doc) = with_two_jobs();
        let before = history.len();
        let cases = [
            ("current", json!("yes")),
            ("salary", json!("lots")),
            ("id", json!(uuid::Uuid::new_v4())),
            ("startDate", json!(2020)),
        ];
        for (field, value) in cases {
            let next = set_entry_field(&mut history, &doc, Section::Experience, 0, field, value);
            assert_eq!(next, doc, "field {field} should be rejected");
        }
        assert_eq!(history.len(), before);
    }

    #[test]
    fn test_skill_level_outside_scale_is_noop() {
        let (mut history, doc) = fresh();
        let doc = add_entry(&mut history, &doc, Section::Skills);
        for level in [0, 6] {
            let next = set_entry_field(&mut history, &doc, Section::Skills, 0, "level", json!(level));
            assert_eq!(next, doc);
        }
        let next = set_entry_field(&mut history, &doc, Section::Skills, 0, "level", json!(5));
        assert_eq!(next.skills[0].level, 5);
    }

    #[test]
    fn test_add_and_remove_skill_scenario() {
        let (mut history, doc) = fresh();
        let doc = add_entry(&mut history, &doc, Section::Skills);
        assert_eq!(doc.skills.len(), 1);
        assert_eq!(doc.skills[0].level, SKILL_LEVEL_DEFAULT);

        let doc = remove_entry(&mut history, &doc, Section::Skills, 0);
        assert!(doc.skills.is_empty());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_remove_entry_shifts_down() {
        let (mut history, doc) = with_two_jobs();
        let second = doc.experience[1].id;
        let next = remove_entry(&mut history, &doc, Section::Experience, 0);
        assert_eq!(next.experience.len(), 1);
        assert_eq!(next.experience[0].id, second);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let (mut history, doc) = with_two_jobs();
        let before = history.len();
        assert_eq!(remove_entry(&mut history, &doc, Section::Experience, 2), doc);
        assert_eq!(remove_entry(&mut history, &doc, Section::Skills, 0), doc);
        assert_eq!(history.len(), before);
    }

    #[test]
    fn test_undo_after_mutations_returns_to_empty() {
        let (mut history, doc) = fresh();
        let doc = set_scalar_field(&mut history, &doc, "personalInfo.name", "Ada");
        let doc = add_entry(&mut history, &doc, Section::Education);
        let _ = set_entry_field(&mut history, &doc, Section::Education, 0, "degree", json!("BSc"));
        for _ in 0..3 {
            history.undo();
        }
        assert_eq!(history.current(), &empty_document());
    }
}
