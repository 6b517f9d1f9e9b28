use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::template::{template_or_default, DEFAULT_TEMPLATE_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    Compact,
    Normal,
    Relaxed,
}

impl Spacing {
    /// Vertical gap between sections, in CSS pixels.
    pub fn section_gap_px(&self) -> u8 {
        match self {
            Spacing::Compact => 8,
            Spacing::Normal => 16,
            Spacing::Relaxed => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    Modern,
    Traditional,
    Creative,
    Minimal,
    Ats,
}

impl LayoutVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::Modern => "modern",
            LayoutVariant::Traditional => "traditional",
            LayoutVariant::Creative => "creative",
            LayoutVariant::Minimal => "minimal",
            LayoutVariant::Ats => "ats",
        }
    }
}

/// Blocks of the rendered resume that can be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
}

impl SectionKind {
    pub const CANONICAL: [SectionKind; 7] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Certifications,
        SectionKind::Languages,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
            SectionKind::Certifications => "Certifications",
            SectionKind::Languages => "Languages",
        }
    }
}

const FONT_FAMILY_MAX_LEN: usize = 100;

/// Reasons a client-supplied customization is refused. Every value ends up
/// inside an inline `style` attribute of the rendered page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomizationError {
    #[error("{0} must be a #rrggbb color")]
    InvalidColor(&'static str),

    #[error("fontFamily must be 1-100 letters, digits, spaces, commas, quotes or hyphens")]
    InvalidFontFamily,
}

/// Style parameters attached 1:1 to a resume. Changed outside of undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub font_family: String,
    pub font_size_px: u8,
    pub primary_color: String,
    pub secondary_color: String,
    pub spacing: Spacing,
    pub layout: LayoutVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_order: Option<Vec<SectionKind>>,
}

impl Customization {
    /// Starting style for a template. Unknown ids get the default template's style.
    pub fn for_template(template_id: &str) -> Self {
        let template = template_or_default(template_id);
        Self {
            font_family: template.font_family.to_string(),
            font_size_px: 14,
            primary_color: template.primary_color.to_string(),
            secondary_color: "#6b7280".to_string(),
            spacing: Spacing::Normal,
            layout: template.layout,
            section_order: None,
        }
    }

    pub fn validate(&self) -> Result<(), CustomizationError> {
        if !is_hex_color(&self.primary_color) {
            return Err(CustomizationError::InvalidColor("primaryColor"));
        }
        if !is_hex_color(&self.secondary_color) {
            return Err(CustomizationError::InvalidColor("secondaryColor"));
        }
        let font = self.font_family.trim();
        let font_ok = !font.is_empty()
            && font.len() <= FONT_FAMILY_MAX_LEN
            && font
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '\'' | '-'));
        if !font_ok {
            return Err(CustomizationError::InvalidFontFamily);
        }
        Ok(())
    }

    /// The order sections are laid out in: any custom order first, then the
    /// remaining sections in canonical order. Duplicates are ignored.
    pub fn resolved_section_order(&self) -> Vec<SectionKind> {
        let mut order: Vec<SectionKind> = Vec::with_capacity(SectionKind::CANONICAL.len());
        for kind in self.section_order.iter().flatten() {
            if !order.contains(kind) {
                order.push(*kind);
            }
        }
        for kind in SectionKind::CANONICAL {
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
        order
    }
}

impl Default for Customization {
    fn default() -> Self {
        Self::for_template(DEFAULT_TEMPLATE_ID)
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7 && color.starts_with('#') && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Appends a two-digit hex alpha to a `#rrggbb` color. Other color syntaxes
/// are returned unchanged.
pub fn tint(color: &str, alpha_hex: &str) -> String {
    if is_hex_color(color) {
        format!("{color}{alpha_hex}")
    } else {
        color.to_string()
    }
}
