//! Resume document shape: the single structured record a user edits.
//!
//! Wire names are camelCase so the browser client can round-trip the
//! document it renders its forms from.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// The repeatable (list-valued) sections of a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
        Section::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Languages => "languages",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown section '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

/// Common behaviour of every list entry.
pub trait Entry: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    /// The field whose emptiness decides whether the entry is rendered.
    fn primary(&self) -> &str;
    /// Range checks beyond what the field types enforce.
    fn is_valid(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: Uuid,
    pub degree: String,
    pub university: String,
    pub location: String,
    pub graduation_date: String,
    pub gpa: String,
    pub achievements: String,
}

/// Skill proficiency runs 1..=5.
pub const SKILL_LEVEL_MAX: u8 = 5;
pub const SKILL_LEVEL_DEFAULT: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub id: Uuid,
    pub name: String,
    pub level: u8,
    pub category: String,
}

impl Default for SkillEntry {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            level: SKILL_LEVEL_DEFAULT,
            category: "Technical".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub technologies: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub id: Uuid,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub credential_id: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageProficiency {
    Beginner,
    Intermediate,
    Advanced,
    Fluent,
}

impl LanguageProficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageProficiency::Beginner => "Beginner",
            LanguageProficiency::Intermediate => "Intermediate",
            LanguageProficiency::Advanced => "Advanced",
            LanguageProficiency::Fluent => "Fluent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub id: Uuid,
    pub language: String,
    pub proficiency: LanguageProficiency,
    /// CEFR level, e.g. "B2".
    pub level: String,
}

impl Default for LanguageEntry {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            language: String::new(),
            proficiency: LanguageProficiency::Intermediate,
            level: "B2".to_string(),
        }
    }
}

macro_rules! impl_entry {
    ($ty:ty, $primary:ident) => {
        impl_entry!($ty, $primary, |_entry| true);
    };
    ($ty:ty, $primary:ident, $valid:expr) => {
        impl Entry for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn set_id(&mut self, id: Uuid) {
                self.id = id;
            }

            fn primary(&self) -> &str {
                &self.$primary
            }

            fn is_valid(&self) -> bool {
                let check: fn(&$ty) -> bool = $valid;
                check(self)
            }
        }
    };
}

impl_entry!(ExperienceEntry, title);
impl_entry!(EducationEntry, degree);
impl_entry!(SkillEntry, name, SkillEntry::level_in_range);

impl SkillEntry {
    pub fn level_in_range(&self) -> bool {
        (1..=SKILL_LEVEL_MAX).contains(&self.level)
    }
}
impl_entry!(ProjectEntry, name);
impl_entry!(CertificationEntry, name);
impl_entry!(LanguageEntry, language);

/// A freshly created entry for one section, see [`new_entry`].
#[derive(Debug, Clone, PartialEq)]
pub enum NewEntry {
    Experience(ExperienceEntry),
    Education(EducationEntry),
    Skill(SkillEntry),
    Project(ProjectEntry),
    Certification(CertificationEntry),
    Language(LanguageEntry),
}

/// Creates a category-specific entry with a fresh id and default values.
///
/// Ids are random v4 UUIDs, so entries created within the same clock tick
/// never collide.
pub fn new_entry(section: Section) -> NewEntry {
    let id = Uuid::new_v4();
    match section {
        Section::Experience => NewEntry::Experience(ExperienceEntry {
            id,
            ..Default::default()
        }),
        Section::Education => NewEntry::Education(EducationEntry {
            id,
            ..Default::default()
        }),
        Section::Skills => NewEntry::Skill(SkillEntry {
            id,
            ..Default::default()
        }),
        Section::Projects => NewEntry::Project(ProjectEntry {
            id,
            ..Default::default()
        }),
        Section::Certifications => NewEntry::Certification(CertificationEntry {
            id,
            ..Default::default()
        }),
        Section::Languages => NewEntry::Language(LanguageEntry {
            id,
            ..Default::default()
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub languages: Vec<LanguageEntry>,
}

/// The canonical empty document: every scalar `""`, every list empty.
pub fn empty_document() -> ResumeDocument {
    ResumeDocument::default()
}

impl ResumeDocument {
    /// Appends an entry to the list its variant belongs to.
    pub fn push_entry(&mut self, entry: NewEntry) {
        match entry {
            NewEntry::Experience(e) => self.experience.push(e),
            NewEntry::Education(e) => self.education.push(e),
            NewEntry::Skill(e) => self.skills.push(e),
            NewEntry::Project(e) => self.projects.push(e),
            NewEntry::Certification(e) => self.certifications.push(e),
            NewEntry::Language(e) => self.languages.push(e),
        }
    }

    /// Ids of every entry in every section, in display order.
    #[cfg(test)]
    pub fn entry_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        ids.extend(self.experience.iter().map(Entry::id));
        ids.extend(self.education.iter().map(Entry::id));
        ids.extend(self.skills.iter().map(Entry::id));
        ids.extend(self.projects.iter().map(Entry::id));
        ids.extend(self.certifications.iter().map(Entry::id));
        ids.extend(self.languages.iter().map(Entry::id));
        ids
    }

    /// Regenerates any entry id that is nil or already used earlier in the
    /// document. Returns how many ids were replaced.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut replaced = 0;
        replaced += reassign_duplicates(&mut self.experience, &mut seen);
        replaced += reassign_duplicates(&mut self.education, &mut seen);
        replaced += reassign_duplicates(&mut self.skills, &mut seen);
        replaced += reassign_duplicates(&mut self.projects, &mut seen);
        replaced += reassign_duplicates(&mut self.certifications, &mut seen);
        replaced += reassign_duplicates(&mut self.languages, &mut seen);
        replaced
    }
}

fn reassign_duplicates<E: Entry>(entries: &mut [E], seen: &mut HashSet<Uuid>) -> usize {
    let mut replaced = 0;
    for entry in entries.iter_mut() {
        if entry.id().is_nil() || !seen.insert(entry.id()) {
            let mut id = Uuid::new_v4();
            while !seen.insert(id) {
                id = Uuid::new_v4();
            }
            entry.set_id(id);
            replaced += 1;
        }
    }
    replaced
}
