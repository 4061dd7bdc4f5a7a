//! Text measurement and wrapping for titles, captions and legend entries.

/// Heuristic pixel width of `text` (Plotters has no text measuring on every backend).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Same estimate for bold faces, which run wider.
pub fn estimate_bold_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.66).ceil() as u32
}

/// Greedy word wrap to `max_px`. Words longer than a line are kept whole on their own line.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if cur.is_empty() || estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
        } else {
            lines.push(std::mem::replace(&mut cur, word.to_string()));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Strip the small subset of inline markup allowed in captions (`<em>`, `<br />`, `<span>`, `<a>`).
///
/// `<br>` variants become newlines; every other tag is dropped.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
                if tag.starts_with("br") {
                    out.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text_to_width("Quarterly growth of world trade", 10, 100);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| !l.starts_with(' ')));
        assert_eq!(lines.join(" "), "Quarterly growth of world trade");
    }

    #[test]
    fn long_word_stays_whole() {
        let lines = wrap_text_to_width("Supercalifragilistic", 14, 20);
        assert_eq!(lines, vec!["Supercalifragilistic"]);
    }

    #[test]
    fn strips_caption_markup() {
        assert_eq!(
            strip_markup("<em>Source:</em> UNCTAD <br />Note: <a href=\"x\">nowcast</a>"),
            "Source: UNCTAD \nNote: nowcast"
        );
        assert_eq!(strip_markup("a < b"), "a < b");
    }
}
