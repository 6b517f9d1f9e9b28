use crate::render::projection::{Projection, SectionBlock};

/// Plain-text rendering of a projection, for "copy to clipboard".
pub fn plain_text(projection: &Projection) -> String {
    let header = &projection.header;
    let mut blocks: Vec<String> = Vec::new();

    let mut head = vec!["RESUME".to_string(), "=".repeat(50), String::new()];
    head.push(header.name.clone());
    head.push(header.title.clone());
    if !header.contact.is_empty() {
        head.push(header.contact.join(" | "));
    }
    head.extend(header.links.iter().cloned());
    blocks.push(head.join("\n"));

    for section in &projection.sections {
        let title = section.heading().to_uppercase();
        let body = match section {
            SectionBlock::Summary { text, .. } => text.clone(),
            SectionBlock::Experience { items, .. } => items
                .iter()
                .map(|e| {
                    let mut line = format!("• {} at {} ({})", e.title, e.company, e.dates);
                    if let Some(description) = &e.description {
                        line.push_str("\n  ");
                        line.push_str(description);
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
            SectionBlock::Education { items, .. } => items
                .iter()
                .map(|e| {
                    let mut line = format!("• {} - {} ({})", e.degree, e.university, e.graduation_date);
                    if let Some(gpa) = &e.gpa {
                        line.push_str(&format!(" | GPA: {gpa}"));
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n"),
            SectionBlock::Skills { items, .. } => items
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            SectionBlock::Projects { items, .. } => items
                .iter()
                .map(|p| match &p.description {
                    Some(description) => format!("• {}: {}", p.name, description),
                    None => format!("• {}", p.name),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            SectionBlock::Certifications { items, .. } => items
                .iter()
                .map(|c| format!("• {} - {}", c.name, c.issuer))
                .collect::<Vec<_>>()
                .join("\n"),
            SectionBlock::Languages { items, .. } => items.join(", "),
        };
        blocks.push(format!("{title}:\n{body}"));
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customization::Customization;
    use crate::models::resume::{empty_document, new_entry, Section};
    use crate::render::projection::project;

    #[test]
    fn test_plain_text_sections() {
        let mut doc = empty_document();
        doc.personal_info.name = "Ada Lovelace".into();
        doc.personal_info.email = "ada@example.com".into();
        doc.personal_info.phone = "555".into();
        doc.summary = "Poetical science.".into();
        doc.push_entry(new_entry(Section::Experience));
        doc.experience[0].title = "Analyst".into();
        doc.experience[0].company = "Babbage & Co".into();
        doc.experience[0].start_date = "1842".into();
        doc.experience[0].current = true;
        doc.push_entry(new_entry(Section::Skills));
        doc.skills[0].name = "Mathematics".into();

        let text = plain_text(&project(&doc, &Customization::default()));
        assert!(text.starts_with("RESUME\n"));
        assert!(text.contains("Ada Lovelace\nProfessional Title\nada@example.com | 555"));
        assert!(text.contains("PROFESSIONAL SUMMARY:\nPoetical science."));
        assert!(text.contains("• Analyst at Babbage & Co (1842 – Present)"));
        assert!(text.contains("SKILLS:\nMathematics"));
        assert!(!text.contains("EDUCATION"));
    }
}
