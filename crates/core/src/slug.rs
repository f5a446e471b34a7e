use std::collections::HashMap;

/// Heading slug generator with github-slugger semantics.
///
/// Slugs are unique per instance: repeats get `-1`, `-2`, ... suffixes, so a
/// fresh `Slugger` is used for every document.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unique slug for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

/// Lowercases `text`, drops punctuation and turns spaces into hyphens.
///
/// No trimming and no hyphen collapsing, matching github-slugger.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        } else if !ch.is_ascii() && (ch.is_alphanumeric() || is_combining_mark(ch)) {
            slug.extend(ch.to_lowercase());
        }
    }
    slug
}

/// Unicode combining marks that github-slugger keeps (Mn/Mc/Me for the
/// scripts that show up in headings in practice).
fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0591..=0x05BD
            | 0x05BF
            | 0x05C1..=0x05C2
            | 0x05C4..=0x05C5
            | 0x05C7
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0670
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0951..=0x0957
            | 0x0962..=0x0963
            | 0x0980..=0x0983
            | 0x09BC..=0x09CD
            | 0x0E31..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_get_numeric_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Title"), "title");
        assert_eq!(slugger.slug("Title"), "title-1");
        assert_eq!(slugger.slug("title"), "title-2");
    }

    #[test]
    fn matches_github_slugger_on_docs_headings() {
        let cases = [
            ("Hello World", "hello-world"),
            ("import.meta.glob", "importmetaglob"),
            ("<Image />", "image-"),
            ("  a---b  ", "--a---b--"),
            ("多言語 ガイド", "多言語-ガイド"),
            ("getStaticPaths()", "getstaticpaths"),
            ("Café résumé", "café-résumé"),
        ];
        for (input, expected) in cases {
            assert_eq!(slugify(input), expected, "{input}");
        }
    }

    #[test]
    fn punctuation_only_heading_gives_empty_slug() {
        assert_eq!(slugify("?!"), "");
    }
}
