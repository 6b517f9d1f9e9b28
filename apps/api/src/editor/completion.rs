use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeDocument;

/// One line of the progress checklist shown beside the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub section: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionReport {
    pub percentage: u8,
    pub checklist: Vec<ChecklistItem>,
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Weighted 0–100 completion score.
///
/// Rubric: personal `name`/`title`/`email` (1 unit each); first experience
/// `title`/`company` and first education `degree`/`university` (1 unit each,
/// counted only when the list is non-empty); skills present (1); summary (1).
/// Empty experience/education lists add nothing to either side of the ratio,
/// so a resume can reach 100 without them.
pub fn completion_percentage(doc: &ResumeDocument) -> u8 {
    let mut total = 0u32;
    let mut done = 0u32;

    let info = &doc.personal_info;
    for field in [&info.name, &info.title, &info.email] {
        total += 1;
        done += u32::from(filled(field));
    }

    if let Some(first) = doc.experience.first() {
        total += 2;
        done += u32::from(filled(&first.title));
        done += u32::from(filled(&first.company));
    }

    if let Some(first) = doc.education.first() {
        total += 2;
        done += u32::from(filled(&first.degree));
        done += u32::from(filled(&first.university));
    }

    total += 1;
    done += u32::from(!doc.skills.is_empty());

    total += 1;
    done += u32::from(filled(&doc.summary));

    if total == 0 {
        return 0;
    }
    (f64::from(done) / f64::from(total) * 100.0).round() as u8
}

pub fn completion_report(doc: &ResumeDocument) -> CompletionReport {
    let checklist = vec![
        ChecklistItem {
            section: "personal_info".to_string(),
            done: !doc.personal_info.name.is_empty(),
        },
        ChecklistItem {
            section: "experience".to_string(),
            done: !doc.experience.is_empty(),
        },
        ChecklistItem {
            section: "education".to_string(),
            done: !doc.education.is_empty(),
        },
        ChecklistItem {
            section: "skills".to_string(),
            done: !doc.skills.is_empty(),
        },
    ];
    CompletionReport {
        percentage: completion_percentage(doc),
        checklist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{empty_document, new_entry, Section};

    #[test]
    fn test_empty_document_scores_zero() {
        assert_eq!(completion_percentage(&empty_document()), 0);
    }

    #[test]
    fn test_personal_only_scores_sixty() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.title = "Engineer".into();
        doc.personal_info.email = "ada@example.com".into();
        // 3 of 5: empty experience/education are skipped entirely
        assert_eq!(completion_percentage(&doc), 60);
    }

    #[test]
    fn test_full_without_experience_scores_hundred() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.title = "Engineer".into();
        doc.personal_info.email = "ada@example.com".into();
        doc.summary = "Analytical engines.".into();
        doc.push_entry(new_entry(Section::Skills));
        assert_eq!(completion_percentage(&doc), 100);
    }

    #[test]
    fn test_blank_experience_entry_lowers_score() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.title = "Engineer".into();
        doc.personal_info.email = "ada@example.com".into();
        doc.push_entry(new_entry(Section::Experience));
        // 3 of 7
        assert_eq!(completion_percentage(&doc), 43);

        doc.experience[0].title = "Lead".into();
        doc.experience[0].company = "Acme".into();
        // 5 of 7
        assert_eq!(completion_percentage(&doc), 71);
    }

    #[test]
    fn test_only_first_education_entry_counts() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Education));
        doc.push_entry(new_entry(Section::Education));
        doc.education[1].degree = "MSc".into();
        doc.education[1].university = "ETH".into();
        assert_eq!(completion_percentage(&doc), 0);
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let mut doc = empty_document();
        doc.personal_info.name = "   ".into();
        doc.summary = "\n\t".into();
        assert_eq!(completion_percentage(&doc), 0);
    }

    #[test]
    fn test_report_checklist() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.push_entry(new_entry(Section::Skills));
        let report = completion_report(&doc);
        let done: Vec<_> = report
            .checklist
            .iter()
            .filter(|item| item.done)
            .map(|item| item.section.as_str())
            .collect();
        assert_eq!(done, vec!["personal_info", "skills"]);
        assert_eq!(report.percentage, completion_percentage(&doc));
    }
}
