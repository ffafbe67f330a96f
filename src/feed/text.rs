// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Maximum length, in characters, of plain-text summary fields
pub const SUMMARY_LIMIT: usize = 255;

const ELLIPSIS: &str = "...";

/// Drop characters that XML 1.0 cannot represent, even escaped
pub fn xml_safe(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// Convert an HTML fragment into a single line of plain text
///
/// Tags are removed (an unclosed tag runs to the end of the input), entities
/// are decoded, any angle brackets that decoding produced are dropped and
/// whitespace runs collapse to one space.
pub fn plain_text(html: &str) -> String {
    let stripped = strip_tags(html);
    let decoded = html_escape::decode_html_entities(&stripped);

    let mut result = String::with_capacity(decoded.len());
    let mut last_was_space = true;

    for c in decoded.chars() {
        if c == '<' || c == '>' || !is_xml_char(c) {
            continue;
        }
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim_end().to_string()
}

/// Plain-text summary bounded to [`SUMMARY_LIMIT`] characters
pub fn summary(html: &str) -> String {
    truncate_at_boundary(&plain_text(html), SUMMARY_LIMIT)
}

fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if in_tag {
            if c == '>' {
                // Keeps words from adjacent block elements apart
                result.push(' ');
                in_tag = false;
            }
            continue;
        }

        // A bare `<` in prose is text, not the start of a tag
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|&next| next.is_ascii_alphabetic() || next == '/' || next == '!');
        if opens_tag {
            in_tag = true;
        } else {
            result.push(c);
        }
    }

    result
}

/// Truncate to at most `max_chars` characters, preferring a word boundary
///
/// A truncated result ends with an ellipsis, counted within the limit.
pub fn truncate_at_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let truncated: String = text.chars().take(budget).collect();

    let cut = match truncated.rfind(' ') {
        Some(pos) if truncated[..pos].chars().count() > budget / 2 => &truncated[..pos],
        _ => truncated.as_str(),
    };

    format!("{}{}", cut.trim_end(), ELLIPSIS)
}

/// Split text into CDATA-safe pieces
///
/// A literal `]]>` cannot appear inside one CDATA section, so it is split
/// between two consecutive sections.
pub fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}
