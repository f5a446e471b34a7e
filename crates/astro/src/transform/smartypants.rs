//! Smart punctuation over rendered HTML (smart quotes, dashes, ellipsis).

use std::iter::Peekable;
use std::str::Chars;

/// Elements whose contents are never rewritten.
const VERBATIM_TAGS: &[&str] = &["code", "pre", "script", "style", "kbd", "samp"];

/// Inline elements that do not break the surrounding text run, so a quote
/// right after `</em>` still closes.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "del", "em", "i", "kbd", "mark", "s", "samp", "small", "span",
    "strong", "sub", "sup", "u",
];

/// Applies smartypants-style replacements to the text of an HTML fragment.
///
/// Tags and their attributes pass through untouched, as does everything
/// inside `code`, `pre`, `script` and `style`. `&quot;` is treated as a
/// straight double quote, since that is how the renderer encodes `"` in text.
pub fn apply_smartypants(input: &str) -> String {
    if !input.contains(['\'', '-']) && !input.contains("&quot;") && !input.contains("...") {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut verbatim_depth = 0usize;
    // Last text character in the current run; `None` at the start of a block.
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        if c == '<' {
            let tag = consume_tag(&mut chars);
            let (closing, name) = tag_name(&tag);
            if VERBATIM_TAGS.contains(&name.as_str()) {
                verbatim_depth = if closing {
                    verbatim_depth.saturating_sub(1)
                } else {
                    verbatim_depth + 1
                };
            }
            if !INLINE_TAGS.contains(&name.as_str()) {
                prev = None;
            }
            out.push_str(&tag);
            continue;
        }

        if verbatim_depth > 0 {
            out.push(c);
            prev = Some(c);
            continue;
        }

        if c == '&' {
            let entity = consume_entity(&mut chars);
            if entity == "&quot;" {
                let quote = smart_quote('"', prev);
                out.push(quote);
                prev = Some(quote);
            } else {
                out.push_str(&entity);
                prev = Some(';');
            }
            continue;
        }

        prev = Some(replace_punctuation(c, prev, &mut chars, &mut out));
    }

    out
}

/// Reads the rest of a tag after `<`, returning it including both brackets.
fn consume_tag(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut tag = String::from("<");
    let mut quote: Option<char> = None;
    for n in chars.by_ref() {
        tag.push(n);
        match (quote, n) {
            (Some(q), _) if n == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(n),
            (None, '>') => break,
            _ => {}
        }
    }
    tag
}

/// Lowercased element name of a tag, and whether it is a closing tag.
fn tag_name(tag: &str) -> (bool, String) {
    let inner = tag.trim_start_matches('<');
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name = inner
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    (closing, name)
}

/// Reads a character reference after `&`. Anything that is not a
/// well-formed reference is returned as consumed so far.
fn consume_entity(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut entity = String::from("&");
    while let Some(&n) = chars.peek() {
        if n.is_ascii_alphanumeric() || n == '#' {
            entity.push(n);
            chars.next();
        } else {
            if n == ';' {
                entity.push(n);
                chars.next();
            }
            break;
        }
    }
    entity
}

fn is_opening(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || "([{\u{201c}\u{2018}\u{2013}\u{2014}".contains(c),
    }
}

fn smart_quote(c: char, prev: Option<char>) -> char {
    match (c, is_opening(prev)) {
        ('"', true) => '\u{201c}',
        ('"', false) => '\u{201d}',
        (_, true) => '\u{2018}',
        (_, false) => '\u{2019}',
    }
}

/// Replaces ASCII punctuation with smart Unicode equivalents, returning the
/// last character written.
fn replace_punctuation(
    c: char,
    prev: Option<char>,
    chars: &mut Peekable<Chars<'_>>,
    out: &mut String,
) -> char {
    let written = match c {
        '-' if chars.peek() == Some(&'-') => {
            chars.next();
            if chars.next_if_eq(&'-').is_some() {
                '\u{2014}'
            } else {
                '\u{2013}'
            }
        }
        '.' if chars.peek() == Some(&'.') && chars.clone().nth(1) == Some('.') => {
            chars.next();
            chars.next();
            '\u{2026}'
        }
        '"' | '\'' => smart_quote(c, prev),
        _ => c,
    };
    out.push(written);
    written
}

#[cfg(test)]
mod tests {
    use super::apply_smartypants;

    #[test]
    fn transforms_basic_punctuation() {
        let input = "<p>Hello -- &quot;world&quot; ... and 'quote' --- end</p>";
        let out = apply_smartypants(input);
        assert_eq!(
            out,
            "<p>Hello \u{2013} \u{201c}world\u{201d} \u{2026} and \u{2018}quote\u{2019} \u{2014} end</p>"
        );
    }

    #[test]
    fn apostrophes_close() {
        assert_eq!(apply_smartypants("<p>don't</p>"), "<p>don\u{2019}t</p>");
    }

    #[test]
    fn quotes_open_at_block_start_and_close_after_inline_tags() {
        let out = apply_smartypants("<p>&quot;<em>word</em>&quot;</p>");
        assert_eq!(out, "<p>\u{201c}<em>word</em>\u{201d}</p>");
    }

    #[test]
    fn skips_code_and_pre() {
        let input = "<p><code>&quot;---&quot;</code> outside -- ok</p><pre><code>a -- b\n</code></pre>";
        let out = apply_smartypants(input);
        assert!(out.contains("<code>&quot;---&quot;</code>"));
        assert!(out.contains("outside \u{2013} ok"));
        assert!(out.contains("a -- b"));
    }

    #[test]
    fn leaves_attributes_and_other_entities_alone() {
        let input = r#"<p><a href="/a--b" title="it's">x -- y</a> &amp; z</p>"#;
        let out = apply_smartypants(input);
        assert!(out.contains(r#"href="/a--b""#));
        assert!(out.contains(r#"title="it's""#));
        assert!(out.contains("x \u{2013} y"));
        assert!(out.contains("&amp; z"));
    }
}
