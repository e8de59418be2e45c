//! Markdown section extraction.
//!
//! For engines that cannot be constrained to JSON, a long answer is often
//! organised under headings such as `## Preserved from Thesis`. This is the
//! one shared utility for pulling those bodies out; a section ends at the
//! next heading of the same or a higher level.

/// A heading line: `(level, title)`, e.g. `## Risks:` -> `(2, "Risks")`
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 {
        return None;
    }
    let title = trimmed[level..].trim();
    if title.is_empty() {
        return None;
    }
    Some((level, title.trim_end_matches(':').trim()))
}

/// Body of the first section whose heading matches `title`
/// (case-insensitive, trailing colon ignored).
///
/// Returns `None` when the heading is absent. An empty body is returned as
/// `Some("")` so callers can tell "missing" from "blank".
///
/// ```
/// use deliberation_domain::extraction::section;
///
/// let text = "## Thesis\nStrong case.\n## Antithesis\nCounter case.";
/// assert_eq!(section(text, "thesis").as_deref(), Some("Strong case."));
/// assert_eq!(section(text, "Synthesis"), None);
/// ```
pub fn section(text: &str, title: &str) -> Option<String> {
    let wanted = title.trim().trim_end_matches(':').to_lowercase();
    let mut lines = text.lines();

    let level = loop {
        let line = lines.next()?;
        if let Some((level, t)) = heading(line)
            && t.to_lowercase() == wanted
        {
            break level;
        }
    };

    let mut body = Vec::new();
    for line in lines {
        if let Some((next_level, _)) = heading(line)
            && next_level <= level
        {
            break;
        }
        body.push(line);
    }

    Some(body.join("\n").trim().to_string())
}

/// All top-level sections in order as `(title, body)` pairs.
///
/// "Top-level" is the smallest heading level present in the text; deeper
/// headings stay inside their parent's body.
pub fn sections(text: &str) -> Vec<(String, String)> {
    let Some(top) = text.lines().filter_map(heading).map(|(l, _)| l).min() else {
        return Vec::new();
    };

    let mut out: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        match heading(line) {
            Some((level, title)) if level == top => {
                if let Some((t, body)) = current.take() {
                    out.push((t, body.join("\n").trim().to_string()));
                }
                current = Some((title.to_string(), Vec::new()));
            }
            _ => {
                if let Some((_, body)) = current.as_mut() {
                    body.push(line);
                }
            }
        }
    }
    if let Some((t, body)) = current {
        out.push((t, body.join("\n").trim().to_string()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBLATION: &str = "Intro text.

## Preserved from Thesis
- growth focus
- brand

## Negated from Thesis
- short-termism
### Detail
more detail

## The Transcendent Synthesis:
A third way.

## Final Synthesis Statement
Do both, sequenced.";

    #[test]
    fn test_section_found() {
        assert_eq!(
            section(SUBLATION, "Preserved from Thesis").as_deref(),
            Some("- growth focus\n- brand")
        );
    }

    #[test]
    fn test_section_keeps_subheadings() {
        let negated = section(SUBLATION, "negated from thesis").unwrap();
        assert!(negated.contains("### Detail"));
        assert!(negated.contains("more detail"));
        assert!(!negated.contains("third way"));
    }

    #[test]
    fn test_section_trailing_colon_and_last() {
        assert_eq!(
            section(SUBLATION, "The Transcendent Synthesis").as_deref(),
            Some("A third way.")
        );
        assert_eq!(
            section(SUBLATION, "Final Synthesis Statement").as_deref(),
            Some("Do both, sequenced.")
        );
    }

    #[test]
    fn test_section_missing_vs_empty() {
        assert_eq!(section(SUBLATION, "Preserved from Antithesis"), None);
        assert_eq!(section("## Empty\n## Next\nx", "Empty").as_deref(), Some(""));
    }

    #[test]
    fn test_sections_listing() {
        let all = sections(SUBLATION);
        let titles: Vec<_> = all.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Preserved from Thesis",
                "Negated from Thesis",
                "The Transcendent Synthesis",
                "Final Synthesis Statement"
            ]
        );
    }

    #[test]
    fn test_sections_without_headings() {
        assert!(sections("just prose").is_empty());
        assert!(sections("").is_empty());
    }
}
