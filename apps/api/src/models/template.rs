//! Static template catalog shown in the template gallery.

use serde::Serialize;

use crate::models::customization::LayoutVariant;

pub const DEFAULT_TEMPLATE_ID: &str = "1";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub layout: LayoutVariant,
    pub font_family: &'static str,
    pub primary_color: &'static str,
    pub palette: &'static [&'static str],
    pub popularity: u8,
    pub is_free: bool,
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "1",
        name: "Modern Pro",
        category: "modern",
        description: "Clean, professional design with emphasis on skills",
        layout: LayoutVariant::Modern,
        font_family: "Inter",
        primary_color: "#2563eb",
        palette: &["#2563eb", "#059669", "#7c3aed"],
        popularity: 95,
        is_free: true,
    },
    Template {
        id: "2",
        name: "Executive",
        category: "professional",
        description: "Traditional format for corporate roles",
        layout: LayoutVariant::Traditional,
        font_family: "Times New Roman",
        primary_color: "#1e40af",
        palette: &["#1e40af", "#374151"],
        popularity: 88,
        is_free: true,
    },
    Template {
        id: "3",
        name: "Creative Portfolio",
        category: "creative",
        description: "For designers, artists, and creative professionals",
        layout: LayoutVariant::Creative,
        font_family: "Montserrat",
        primary_color: "#db2777",
        palette: &["#db2777", "#ea580c"],
        popularity: 92,
        is_free: false,
    },
    Template {
        id: "4",
        name: "Minimalist",
        category: "minimal",
        description: "Simple and elegant design",
        layout: LayoutVariant::Minimal,
        font_family: "Helvetica",
        primary_color: "#4b5563",
        palette: &["#4b5563", "#6b7280"],
        popularity: 85,
        is_free: true,
    },
    Template {
        id: "5",
        name: "ATS Optimized",
        category: "ats",
        description: "Designed to pass through applicant tracking systems",
        layout: LayoutVariant::Ats,
        font_family: "Arial",
        primary_color: "#059669",
        palette: &["#059669", "#2563eb"],
        popularity: 98,
        is_free: true,
    },
    // Shares Modern Pro's styling.
    Template {
        id: "6",
        name: "Tech Resume",
        category: "modern",
        description: "Perfect for software engineers and tech roles",
        layout: LayoutVariant::Modern,
        font_family: "Inter",
        primary_color: "#2563eb",
        palette: &["#2563eb", "#059669", "#7c3aed"],
        popularity: 90,
        is_free: false,
    },
];

pub fn catalog() -> &'static [Template] {
    TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Looks up a template, falling back to the first (default) one.
pub fn template_or_default(id: &str) -> &'static Template {
    find_template(id).unwrap_or(&TEMPLATES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_default_template_present() {
        assert!(find_template(DEFAULT_TEMPLATE_ID).is_some());
        assert!(find_template("42").is_none());
        assert_eq!(template_or_default("42").id, DEFAULT_TEMPLATE_ID);
    }
}
