//! Standalone HTML surface built from a `Projection`. Used for the browser
//! preview iframe and as the input handed to the rasterizer on export.

use std::fmt::Write as _;

use serde::Serialize;

use crate::render::projection::{Projection, SectionBlock};

/// A4 print width; the rasterizer renders the surface at this width.
pub const A4_WIDTH_MM: u32 = 210;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSurface {
    pub html: String,
    pub width_mm: u32,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn heading(out: &mut String, projection: &Projection, text: &str) {
    let _ = write!(
        out,
        r#"<h2 style="color:{};font-size:1.15em;margin:0 0 8px">{}</h2>"#,
        escape_html(&projection.style.heading_color),
        escape_html(text)
    );
}

fn muted(out: &mut String, text: &str) {
    let _ = write!(
        out,
        r#"<p style="opacity:.8;margin:2px 0;white-space:pre-line">{}</p>"#,
        escape_html(text)
    );
}

fn write_section(out: &mut String, projection: &Projection, section: &SectionBlock) {
    let style = &projection.style;
    let _ = write!(
        out,
        r#"<section class="{}" style="margin-bottom:{}px">"#,
        section.heading().to_lowercase().replace(' ', "-"),
        style.section_gap_px
    );
    heading(out, projection, section.heading());

    match section {
        SectionBlock::Summary { text, .. } => muted(out, text),
        SectionBlock::Experience { items, .. } => {
            for item in items {
                let _ = write!(
                    out,
                    r#"<div class="entry"><h3 style="margin:0">{}</h3><span class="dates">{}</span>"#,
                    escape_html(&item.title),
                    escape_html(&item.dates)
                );
                let mut line = item.company.clone();
                if let Some(location) = &item.location {
                    let _ = write!(line, " • {location}");
                }
                muted(out, &line);
                if let Some(description) = &item.description {
                    muted(out, description);
                }
                out.push_str("</div>");
            }
        }
        SectionBlock::Education { items, .. } => {
            for item in items {
                let _ = write!(
                    out,
                    r#"<div class="entry"><h3 style="margin:0">{}</h3><span class="dates">{}</span>"#,
                    escape_html(&item.degree),
                    escape_html(&item.graduation_date)
                );
                let mut line = item.university.clone();
                if let Some(location) = &item.location {
                    let _ = write!(line, " • {location}");
                }
                muted(out, &line);
                if let Some(gpa) = &item.gpa {
                    muted(out, &format!("GPA: {gpa}"));
                }
                if let Some(achievements) = &item.achievements {
                    muted(out, achievements);
                }
                out.push_str("</div>");
            }
        }
        SectionBlock::Skills { items, .. } => {
            out.push_str(r#"<div class="skills" style="display:flex;flex-wrap:wrap;gap:8px">"#);
            for skill in items {
                let _ = write!(
                    out,
                    r#"<span class="pill" style="background:{};color:{};border-radius:999px;padding:2px 12px">{}</span>"#,
                    escape_html(&style.skill_pill_background),
                    escape_html(&style.skill_pill_color),
                    escape_html(&skill.name)
                );
            }
            out.push_str("</div>");
        }
        SectionBlock::Projects { items, .. } => {
            for item in items {
                let _ = write!(
                    out,
                    r#"<div class="entry"><h3 style="margin:0">{}</h3>"#,
                    escape_html(&item.name)
                );
                if let Some(description) = &item.description {
                    muted(out, description);
                }
                if let Some(technologies) = &item.technologies {
                    muted(out, &format!("Technologies: {technologies}"));
                }
                if let Some(link) = &item.link {
                    muted(out, link);
                }
                out.push_str("</div>");
            }
        }
        SectionBlock::Certifications { items, .. } => {
            for item in items {
                let _ = write!(
                    out,
                    r#"<div class="entry"><strong>{}</strong>"#,
                    escape_html(&item.name)
                );
                let mut line = item.issuer.clone();
                if let Some(date) = &item.date {
                    let _ = write!(line, " • {date}");
                }
                muted(out, &line);
                out.push_str("</div>");
            }
        }
        SectionBlock::Languages { items, .. } => {
            out.push_str(r#"<div class="languages" style="display:flex;flex-wrap:wrap;gap:12px">"#);
            for language in items {
                let _ = write!(out, "<span>{}</span>", escape_html(language));
            }
            out.push_str("</div>");
        }
    }
    out.push_str("</section>");
}

/// Renders the projection into a self-contained HTML page.
pub fn render_surface(projection: &Projection) -> RenderSurface {
    let style = &projection.style;
    let header = &projection.header;
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"></head><body style="margin:0;background:#ffffff"><main class="resume layout-{}" style="font-family:{};font-size:{}px;width:{}mm;padding:20mm;box-sizing:border-box;color:#111827">"#,
        escape_html(&style.layout),
        escape_html(&style.font_family),
        style.font_size_px,
        A4_WIDTH_MM
    );

    let _ = write!(
        out,
        r#"<header style="border-bottom:1px solid {};padding-bottom:16px;margin-bottom:16px"><h1 style="color:{};margin:0">{}</h1><p style="margin:4px 0">{}</p>"#,
        escape_html(&style.header_rule_color),
        escape_html(&style.heading_color),
        escape_html(&header.name),
        escape_html(&header.title)
    );
    if !header.contact.is_empty() {
        muted(&mut out, &header.contact.join(" • "));
    }
    if !header.links.is_empty() {
        muted(&mut out, &header.links.join(" • "));
    }
    out.push_str("</header>");

    for section in &projection.sections {
        write_section(&mut out, projection, section);
    }

    out.push_str("</main></body></html>");
    RenderSurface {
        html: out,
        width_mm: A4_WIDTH_MM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customization::Customization;
    use crate::models::resume::{empty_document, new_entry, Section};
    use crate::render::projection::project;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D"</b>'"#),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;&#39;"
        );
    }

    #[test]
    fn test_surface_applies_font_and_heading_color() {
        let mut doc = empty_document();
        doc.summary = "Ships software".into();
        let surface = render_surface(&project(&doc, &Customization::for_template("5")));
        assert!(surface.html.contains("font-family:Arial"));
        assert!(surface.html.contains(r#"<h2 style="color:#059669"#));
        assert!(surface.html.contains("Ships software"));
        assert_eq!(surface.width_mm, A4_WIDTH_MM);
    }

    #[test]
    fn test_surface_escapes_user_content() {
        let mut doc = empty_document();
        doc.personal_info.name = "<script>alert(1)</script>".into();
        let surface = render_surface(&project(&doc, &Customization::default()));
        assert!(!surface.html.contains("<script>"));
        assert!(surface.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_skill_pills_use_tint() {
        let mut doc = empty_document();
        doc.push_entry(new_entry(Section::Skills));
        doc.skills[0].name = "Rust".into();
        let surface = render_surface(&project(&doc, &Customization::default()));
        assert!(surface.html.contains("background:#2563eb20;color:#2563eb"));
        assert!(surface.html.contains(">Rust</span>"));
    }
}
