use crate::error::{FrontmatterError, FrontmatterErrorKind, SourceLocation};
use serde_json::{Map, Value as JsonValue};

/// Raw source of one markdown file, as handed to a single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable identity (module id / path).
    pub id: String,
    /// Full file text.
    pub raw: String,
}

impl Document {
    /// Wraps already-read text.
    pub fn new(id: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw: raw.into(),
        }
    }

    /// Splits the document into metadata and body.
    pub fn parse(&self) -> Result<ParsedDocument, FrontmatterError> {
        split_frontmatter(&self.raw, &self.id)
    }
}

/// A document split into its frontmatter mapping and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Frontmatter mapping (empty when the document has none).
    pub metadata: Map<String, JsonValue>,
    /// Markdown body: everything after the closing fence, byte-for-byte.
    pub content: String,
    /// Byte offset inside the raw text where `content` begins.
    pub body_start: usize,
}

/// A located YAML block inside a document.
#[derive(Debug)]
struct YamlBlock<'a> {
    text: &'a str,
    /// 1-indexed document line of the first line inside the fences.
    first_line: usize,
    body_start: usize,
}

/// Splits YAML frontmatter from markdown content.
///
/// Errors carry `id` as their file and, for YAML syntax failures, the
/// document line/column of the offending token.
pub fn split_frontmatter(raw: &str, id: &str) -> Result<ParsedDocument, FrontmatterError> {
    match find_yaml_block(raw, id)? {
        Some(block) => {
            let metadata = parse_yaml_block(&block, id)?;
            Ok(ParsedDocument {
                metadata,
                content: raw[block.body_start..].to_string(),
                body_start: block.body_start,
            })
        }
        None => Ok(ParsedDocument {
            metadata: Map::new(),
            content: raw.to_string(),
            body_start: 0,
        }),
    }
}

fn parse_yaml_block(block: &YamlBlock<'_>, id: &str) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if block.text.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block.text).map_err(|err| yaml_error(&err, block, id))?;
    let json_value = serde_json::to_value(yaml_value).map_err(|err| {
        FrontmatterError::new(
            FrontmatterErrorKind::Syntax,
            err.to_string(),
            SourceLocation::file(id),
        )
    })?;

    match json_value {
        JsonValue::Null => Ok(Map::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::new(
            FrontmatterErrorKind::NotAMapping,
            "Frontmatter must be a YAML mapping at the top level",
            SourceLocation::at(id, block.first_line, 1),
        )),
    }
}

/// Builds a located error from a YAML failure.
///
/// When the parser exposes a mark, the message is narrowed to the parser's
/// reason and the mark is shifted from block coordinates to document ones.
fn yaml_error(err: &serde_yaml::Error, block: &YamlBlock<'_>, id: &str) -> FrontmatterError {
    let full = err.to_string();
    let mut error = FrontmatterError::new(
        FrontmatterErrorKind::Syntax,
        full.clone(),
        SourceLocation::file(id),
    );

    if let Some(mark) = err.location() {
        error.set_message(yaml_reason(&full));
        error.set_location(SourceLocation::at(
            id,
            block.first_line + mark.line() - 1,
            mark.column(),
        ));
    }

    error
}

fn yaml_reason(message: &str) -> &str {
    match message.find(" at line ") {
        Some(idx) if idx > 0 => &message[..idx],
        _ => message,
    }
}

fn find_yaml_block<'a>(input: &'a str, id: &str) -> Result<Option<YamlBlock<'a>>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    // Only a fence on the very first line opens a block.
    let Some((line, block_start)) = next_line(input, bom_len) else {
        return Ok(None);
    };
    if !is_yaml_fence(line) {
        return Ok(None);
    }

    let mut scan_cursor = block_start;
    while let Some((block_line, next_line_cursor)) = next_line(input, scan_cursor) {
        if is_yaml_fence(block_line) {
            let text = input[block_start..scan_cursor].trim_end_matches(['\r', '\n']);
            return Ok(Some(YamlBlock {
                text,
                first_line: 2,
                body_start: next_line_cursor,
            }));
        }
        scan_cursor = next_line_cursor;
    }

    Err(FrontmatterError::new(
        FrontmatterErrorKind::Unterminated,
        "Unterminated YAML frontmatter block: expected closing '---'",
        SourceLocation::at(id, 1, 1),
    ))
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    match input[start..].find('\n') {
        Some(pos) => Some((&input[start..start + pos], start + pos + 1)),
        None => Some((&input[start..], input.len())),
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> ParsedDocument {
        split_frontmatter(input, "/src/pages/doc.md").expect("frontmatter split should succeed")
    }

    #[test]
    fn returns_empty_when_no_frontmatter() {
        let result = split("# Title\nBody");
        assert_eq!(result.body_start, 0);
        assert!(result.metadata.is_empty());
        assert_eq!(result.content, "# Title\nBody");
    }

    #[test]
    fn parses_basic_yaml() {
        let input = "---\ntitle: Example\ntags:\n  - rust\n  - astro\n---\n# Content";
        let result = split(input);
        assert_eq!(result.body_start, input.find("# Content").unwrap());
        assert_eq!(
            result.metadata.get("title").and_then(JsonValue::as_str),
            Some("Example")
        );
        assert_eq!(result.metadata["tags"][1], "astro");
    }

    #[test]
    fn metadata_block_and_content_partition_the_text() {
        let input = "---\nlayout: ../layouts/Base.astro\n---\n\nHello `world`\n\n";
        let result = split(input);
        assert_eq!(format!("{}{}", &input[..result.body_start], result.content), input);
        assert_eq!(result.content, "\nHello `world`\n\n");
    }

    #[test]
    fn handles_empty_and_null_blocks() {
        assert!(split("---\n---\n# Body").metadata.is_empty());
        assert!(split("---\n~\n---\n# Body").metadata.is_empty());
    }

    #[test]
    fn tolerates_a_leading_bom() {
        let input = "\u{feff}---\nfoo: bar\n---\nBody";
        let result = split(input);
        assert_eq!(result.metadata["foo"], "bar");
        assert_eq!(result.content, "Body");
    }

    #[test]
    fn rules_after_a_blank_first_line_are_body() {
        let input = "\n---\nAn intro paragraph between rules.\n---\n\nBody\n";
        let result = split(input);
        assert!(result.metadata.is_empty());
        assert_eq!(result.body_start, 0);
        assert_eq!(result.content, input);

        let hidden = split("\n---\ntitle: Hidden\n---\nBody\n");
        assert!(hidden.metadata.is_empty());
        assert_eq!(hidden.content, "\n---\ntitle: Hidden\n---\nBody\n");
    }

    #[test]
    fn keeps_keys_in_source_order() {
        let result = split("---\ntitle: Post\ndate: 2024-01-01\nauthor: me\n---\n");
        let keys: Vec<&str> = result.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, ["title", "date", "author"]);
    }

    #[test]
    fn handles_crlf_fences() {
        let input = "---\r\ntitle: Win\r\n---\r\nBody";
        let result = split(input);
        assert_eq!(result.metadata["title"], "Win");
        assert_eq!(result.content, "Body");
    }

    #[test]
    fn locates_yaml_syntax_errors_in_document_coordinates() {
        let input = "---\ntitle: a\n  b: c\n---\nBody";
        let err = split_frontmatter(input, "/src/pages/bad.md").unwrap_err();
        assert_eq!(err.kind, FrontmatterErrorKind::Syntax);
        assert_eq!(err.location.file, "/src/pages/bad.md");
        assert_eq!(err.location.line(), Some(3));
        assert!(err.location.column().is_some());
        assert!(!err.message.contains(" at line "), "{}", err.message);
    }

    #[test]
    fn errors_on_unterminated_block_at_opening_fence() {
        let err = split_frontmatter("---\ntitle: test", "/x.md").unwrap_err();
        assert_eq!(err.kind, FrontmatterErrorKind::Unterminated);
        assert_eq!(err.location.line(), Some(1));
        assert!(err.to_string().contains("/x.md"));
    }

    #[test]
    fn rejects_non_mapping_roots() {
        let err = split_frontmatter("---\n- a\n- b\n---\n", "/x.md").unwrap_err();
        assert_eq!(err.kind, FrontmatterErrorKind::NotAMapping);
    }

    #[test]
    fn document_parse_uses_its_id() {
        let doc = Document::new("/notes/a.md", "---\nbroken: [\n---\n");
        let err = doc.parse().unwrap_err();
        assert_eq!(err.location.file, "/notes/a.md");
    }
}
