//! Render projection: the filtered, section-ordered view of a resume that
//! every rendering surface consumes.
//!
//! Preview and export both draw from the same `Projection`, so what the user
//! sees on screen is what ends up in the PDF.

use serde::{Deserialize, Serialize};

use crate::models::customization::{tint, Customization, SectionKind};
use crate::models::resume::ResumeDocument;

pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const TITLE_PLACEHOLDER: &str = "Professional Title";
pub const PRESENT: &str = "Present";

// ────────────────────────────────────────────────────────────────────────────
// Projection types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionStyle {
    pub font_family: String,
    pub font_size_px: u8,
    pub section_gap_px: u8,
    pub layout: String,
    pub heading_color: String,
    pub text_muted_color: String,
    pub header_rule_color: String,
    pub skill_pill_background: String,
    pub skill_pill_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBlock {
    pub name: String,
    pub title: String,
    /// Non-empty email, phone and location, in that order.
    pub contact: Vec<String>,
    /// Labelled profile links, e.g. "LinkedIn: ...".
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub dates: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub degree: String,
    pub university: String,
    pub location: Option<String>,
    pub graduation_date: String,
    pub gpa: Option<String>,
    pub achievements: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: String,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillItem {
    pub name: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBlock {
    Summary { heading: String, text: String },
    Experience { heading: String, items: Vec<ExperienceItem> },
    Education { heading: String, items: Vec<EducationItem> },
    Skills { heading: String, items: Vec<SkillItem> },
    Projects { heading: String, items: Vec<ProjectItem> },
    Certifications { heading: String, items: Vec<CertificationItem> },
    Languages { heading: String, items: Vec<String> },
}

impl SectionBlock {
    #[cfg(test)]
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionBlock::Summary { .. } => SectionKind::Summary,
            SectionBlock::Experience { .. } => SectionKind::Experience,
            SectionBlock::Education { .. } => SectionKind::Education,
            SectionBlock::Skills { .. } => SectionKind::Skills,
            SectionBlock::Projects { .. } => SectionKind::Projects,
            SectionBlock::Certifications { .. } => SectionKind::Certifications,
            SectionBlock::Languages { .. } => SectionKind::Languages,
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            SectionBlock::Summary { heading, .. }
            | SectionBlock::Experience { heading, .. }
            | SectionBlock::Education { heading, .. }
            | SectionBlock::Skills { heading, .. }
            | SectionBlock::Projects { heading, .. }
            | SectionBlock::Certifications { heading, .. }
            | SectionBlock::Languages { heading, .. } => heading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub style: ProjectionStyle,
    pub header: HeaderBlock,
    pub sections: Vec<SectionBlock>,
}

#[cfg(test)]
impl Projection {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionBlock> {
        self.sections.iter().find(|s| s.kind() == kind)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Projector
// ────────────────────────────────────────────────────────────────────────────

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Date range shown for a job: `start – Present` while current.
pub fn experience_dates(start: &str, end: &str, current: bool) -> String {
    let end = if current { PRESENT } else { end };
    format!("{start} – {end}")
}

fn project_style(c: &Customization) -> ProjectionStyle {
    ProjectionStyle {
        font_family: c.font_family.clone(),
        font_size_px: c.font_size_px,
        section_gap_px: c.spacing.section_gap_px(),
        layout: c.layout.as_str().to_string(),
        heading_color: c.primary_color.clone(),
        text_muted_color: c.secondary_color.clone(),
        header_rule_color: tint(&c.primary_color, "40"),
        skill_pill_background: tint(&c.primary_color, "20"),
        skill_pill_color: c.primary_color.clone(),
    }
}

fn project_header(doc: &ResumeDocument) -> HeaderBlock {
    let info = &doc.personal_info;
    let contact = [&info.email, &info.phone, &info.location]
        .into_iter()
        .filter_map(|v| non_empty(v))
        .collect();
    let links = [
        ("LinkedIn", &info.linkedin),
        ("GitHub", &info.github),
        ("Portfolio", &info.portfolio),
    ]
    .into_iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(label, v)| format!("{label}: {v}"))
    .collect();

    HeaderBlock {
        name: or_placeholder(&info.name, NAME_PLACEHOLDER),
        title: or_placeholder(&info.title, TITLE_PLACEHOLDER),
        contact,
        links,
    }
}

fn project_section(doc: &ResumeDocument, kind: SectionKind) -> Option<SectionBlock> {
    let heading = kind.heading().to_string();
    match kind {
        SectionKind::Summary => {
            non_empty(&doc.summary).map(|text| SectionBlock::Summary { heading, text })
        }
        SectionKind::Experience => {
            // Gated on the first entry, like the preview the editor shows.
            if doc.experience.first().map_or(true, |e| e.title.is_empty()) {
                return None;
            }
            let items = doc
                .experience
                .iter()
                .filter(|e| !e.title.is_empty())
                .map(|e| ExperienceItem {
                    title: e.title.clone(),
                    company: e.company.clone(),
                    location: non_empty(&e.location),
                    dates: experience_dates(&e.start_date, &e.end_date, e.current),
                    description: non_empty(&e.description),
                })
                .collect();
            Some(SectionBlock::Experience { heading, items })
        }
        SectionKind::Education => {
            if doc.education.first().map_or(true, |e| e.degree.is_empty()) {
                return None;
            }
            let items = doc
                .education
                .iter()
                .filter(|e| !e.degree.is_empty())
                .map(|e| EducationItem {
                    degree: e.degree.clone(),
                    university: e.university.clone(),
                    location: non_empty(&e.location),
                    graduation_date: e.graduation_date.clone(),
                    gpa: non_empty(&e.gpa),
                    achievements: non_empty(&e.achievements),
                })
                .collect();
            Some(SectionBlock::Education { heading, items })
        }
        SectionKind::Skills => {
            if doc.skills.is_empty() {
                return None;
            }
            let items = doc
                .skills
                .iter()
                .map(|s| SkillItem {
                    name: s.name.clone(),
                    level: s.level,
                })
                .collect();
            Some(SectionBlock::Skills { heading, items })
        }
        SectionKind::Projects => {
            if doc.projects.is_empty() {
                return None;
            }
            let items = doc
                .projects
                .iter()
                .filter(|p| !p.name.is_empty())
                .map(|p| ProjectItem {
                    name: p.name.clone(),
                    description: non_empty(&p.description),
                    technologies: non_empty(&p.technologies),
                    link: non_empty(&p.link),
                })
                .collect();
            Some(SectionBlock::Projects { heading, items })
        }
        SectionKind::Certifications => {
            if doc.certifications.is_empty() {
                return None;
            }
            let items = doc
                .certifications
                .iter()
                .filter(|c| !c.name.is_empty())
                .map(|c| CertificationItem {
                    name: c.name.clone(),
                    issuer: c.issuer.clone(),
                    date: non_empty(&c.date),
                })
                .collect();
            Some(SectionBlock::Certifications { heading, items })
        }
        SectionKind::Languages => {
            if doc.languages.is_empty() {
                return None;
            }
            let items = doc
                .languages
                .iter()
                .map(|l| format!("{} ({})", l.language, l.proficiency.as_str()))
                .collect();
            Some(SectionBlock::Languages { heading, items })
        }
    }
}

/// Pure projection of a document and its styling into render-ready sections.
pub fn project(doc: &ResumeDocument, customization: &Customization) -> Projection {
    let sections = customization
        .resolved_section_order()
        .into_iter()
        .filter_map(|kind| project_section(doc, kind))
        .collect();
    Projection {
        style: project_style(customization),
        header: project_header(doc),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{empty_document, new_entry, Section};

    fn kinds(p: &Projection) -> Vec<SectionKind> {
        p.sections.iter().map(SectionBlock::kind).collect()
    }

    #[test]
    fn test_empty_document_has_placeholder_header_and_no_sections() {
        let p = project(&empty_document(), &Customization::default());
        assert_eq!(p.header.name, NAME_PLACEHOLDER);
        assert_eq!(p.header.title, TITLE_PLACEHOLDER);
        assert!(p.header.contact.is_empty());
        assert!(p.sections.is_empty());
    }

    #[test]
    fn test_contact_line_omits_missing_fields() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada".into();
        doc.personal_info.email = "ada@example.com".into();
        doc.personal_info.location = "London".into();
        doc.personal_info.github = "ada".into();
        let p = project(&doc, &Customization::default());
        assert_eq!(p.header.name, "Ada");
        assert_eq!(p.header.title, TITLE_PLACEHOLDER);
        assert_eq!(p.header.contact, vec!["ada@example.com", "London"]);
        assert_eq!(p.header.links, vec!["GitHub: ada"]);
    }

    #[test]
    fn test_experience_hidden_when_first_title_empty() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Experience));
        assert_eq!(doc.experience.len(), 1);
        let p = project(&doc, &Customization::default());
        assert!(p.section(SectionKind::Experience).is_none());
    }

    #[test]
    fn test_experience_skips_blank_entries_and_formats_dates() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Experience));
        doc.push_entry(new_entry(Section::Experience));
        doc.push_entry(new_entry(Section::Experience));
        doc.experience[0].title = "Lead".into();
        doc.experience[0].start_date = "2021".into();
        doc.experience[0].end_date = "2022".into();
        doc.experience[0].current = true;
        doc.experience[2].title = "Junior".into();
        doc.experience[2].start_date = "2018".into();
        doc.experience[2].end_date = "2021".into();

        let p = project(&doc, &Customization::default());
        let Some(SectionBlock::Experience { items, .. }) = p.section(SectionKind::Experience)
        else {
            panic!("experience section missing");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].dates, "2021 – Present");
        assert_eq!(items[1].dates, "2018 – 2021");
    }

    #[test]
    fn test_projects_and_certifications_keep_named_entries() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Projects));
        doc.push_entry(new_entry(Section::Certifications));
        doc.push_entry(new_entry(Section::Certifications));
        doc.certifications[1].name = "CKA".into();

        let p = project(&doc, &Customization::default());
        match p.section(SectionKind::Projects) {
            Some(SectionBlock::Projects { items, .. }) => assert!(items.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        match p.section(SectionKind::Certifications) {
            Some(SectionBlock::Certifications { items, .. }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].name, "CKA");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_skills_and_languages_render_every_entry() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Skills));
        doc.push_entry(new_entry(Section::Languages));
        doc.languages[0].language = "German".into();
        let p = project(&doc, &Customization::default());
        match p.section(SectionKind::Skills) {
            Some(SectionBlock::Skills { items, .. }) => assert_eq!(items.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        match p.section(SectionKind::Languages) {
            Some(SectionBlock::Languages { items, .. }) => {
                assert_eq!(items, &vec!["German (Intermediate)".to_string()])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_style_tints_primary_color() {
        let p = project(&empty_document(), &Customization::for_template("3"));
        assert_eq!(p.style.heading_color, "#db2777");
        assert_eq!(p.style.skill_pill_background, "#db277720");
        assert_eq!(p.style.header_rule_color, "#db277740");
        assert_eq!(p.style.font_family, "Montserrat");
    }

    #[test]
    fn test_custom_section_order() {
        let mut doc = empty_document();
        doc.summary = "Hello".into();
        doc.push_entry(new_entry(Section::Skills));
        let customization = Customization {
            section_order: Some(vec![SectionKind::Skills]),
            ..Customization::default()
        };
        let p = project(&doc, &customization);
        assert_eq!(kinds(&p), vec![SectionKind::Skills, SectionKind::Summary]);
        let p = project(&doc, &Customization::default());
        assert_eq!(kinds(&p), vec![SectionKind::Summary, SectionKind::Skills]);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let mut doc = empty_document();
        doc.summary = "Same".into();
        let c = Customization::default();
        assert_eq!(project(&doc, &c), project(&doc, &c));
    }
}
