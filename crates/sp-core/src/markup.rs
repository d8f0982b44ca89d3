//! Rich-text ingestion.
//!
//! The rich-text widget hands back sanitized markup. Overlay text stores
//! plain content only, so tags are dropped (an unterminated `<...` runs to
//! the end of input) and the common character entities are decoded.

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
    ("&nbsp;", '\u{a0}'),
];

/// Strip markup tags and decode basic entities.
pub fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match rest.find('>') {
                Some(end) => rest = &rest[end + 1..],
                None => break,
            },
            '&' => match ENTITIES.iter().find(|(name, _)| rest.starts_with(name)) {
                Some((name, ch)) => {
                    out.push(*ch);
                    rest = &rest[name.len()..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_tags() {
        assert_eq!(strip_markup("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(strip_markup("Fish &amp; chips &lt;3"), "Fish & chips <3");
        assert_eq!(strip_markup("a &unknown; b"), "a &unknown; b");
    }

    #[test]
    fn unterminated_tag_runs_to_end() {
        assert_eq!(strip_markup("keep <span class="), "keep ");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_markup("Ünïcode ✓"), "Ünïcode ✓");
    }
}
