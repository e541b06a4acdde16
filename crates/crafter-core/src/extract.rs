//! Code extraction from model responses.

const FENCE: &str = "```";

/// Language hint on an opening code fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Html,
    Css,
    Jsx,
    Tsx,
    JavaScript,
    TypeScript,
    #[default]
    Unknown,
}

impl Language {
    /// Parse language from code fence info string.
    pub fn from_info(info: &str) -> Self {
        let lang = info.split_whitespace().next().unwrap_or("");
        match lang.to_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "jsx" => Self::Jsx,
            "tsx" => Self::Tsx,
            "js" | "javascript" => Self::JavaScript,
            "ts" | "typescript" => Self::TypeScript,
            _ => Self::Unknown,
        }
    }

    /// Language name understood by the code editor.
    pub fn editor_hint(&self) -> &'static str {
        match self {
            Self::Html | Self::Unknown => "html",
            Self::Css => "css",
            Self::Jsx | Self::JavaScript => "javascript",
            Self::Tsx | Self::TypeScript => "typescript",
        }
    }
}

/// The first complete fenced block in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Info string from the opening fence (empty when absent)
    pub info: String,

    /// Language parsed from the info string
    pub language: Language,

    /// Trimmed block interior
    pub source: String,
}

/// Find the first complete fenced block in `raw`.
///
/// Returns `None` if there is no opening fence or it is never closed.
pub fn find_fenced_block(raw: &str) -> Option<FencedBlock> {
    let open = raw.find(FENCE)?;
    let after_open = &raw[open + FENCE.len()..];

    let line_end = after_open.find('\n').unwrap_or(after_open.len());
    let first_line = &after_open[..line_end];

    // ```code``` on a single line
    if let Some(close) = first_line.find(FENCE) {
        return Some(FencedBlock {
            info: String::new(),
            language: Language::Unknown,
            source: first_line[..close].trim().to_string(),
        });
    }

    let (info, body) = if is_info_string(first_line) {
        (first_line.trim(), after_open.get(line_end + 1..).unwrap_or(""))
    } else {
        ("", after_open)
    };

    let close = body.find(FENCE)?;

    Some(FencedBlock {
        info: info.to_string(),
        language: Language::from_info(info),
        source: body[..close].trim().to_string(),
    })
}

/// Extract the code from a model response.
///
/// Returns the interior of the first complete fenced block, or the whole
/// response when there is none. Both are trimmed. Never fails.
pub fn extract_code(raw: &str) -> String {
    match find_fenced_block(raw) {
        Some(block) => block.source,
        None => raw.trim().to_string(),
    }
}

/// Check if an opening-fence line is an info string rather than code.
///
/// An info string is a language tag optionally followed by metadata such as
/// `title="Card.jsx"` or bare flags.
fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    if line.contains([';', '(', '{', '<']) {
        return false;
    }

    let mut tokens = line.split_whitespace();
    let tag_like = tokens.next().is_some_and(|tag| {
        tag.chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '#' | '.'))
    });

    tag_like
        && tokens.all(|token| match token.split_once('=') {
            Some((key, _)) => {
                !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
            }
            None => true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_language() {
        assert_eq!(Language::from_info("jsx"), Language::Jsx);
        assert_eq!(Language::from_info("HTML"), Language::Html);
        assert_eq!(Language::from_info("typescript"), Language::TypeScript);
        assert_eq!(Language::from_info("vue"), Language::Unknown);
        assert_eq!(Language::from_info(""), Language::Unknown);
    }

    #[test]
    fn extracts_tagged_block() {
        let raw = "```jsx\nexport default function Card() {\n  return <div />;\n}\n```";
        let block = find_fenced_block(raw).unwrap();

        assert_eq!(block.info, "jsx");
        assert_eq!(block.language, Language::Jsx);
        assert_eq!(
            block.source,
            "export default function Card() {\n  return <div />;\n}"
        );
    }

    #[test]
    fn extracts_untagged_block_with_surrounding_prose() {
        let raw = "Here you go:\n```\n<div class=\"card\"></div>\n```\nEnjoy!";
        assert_eq!(extract_code(raw), "<div class=\"card\"></div>");
    }

    #[test]
    fn takes_first_complete_block() {
        let raw = "```html\n<p>one</p>\n```\ntext\n```css\np { color: red; }\n```";
        assert_eq!(extract_code(raw), "<p>one</p>");
    }

    #[test]
    fn unfenced_response_is_trimmed() {
        let raw = "  <button>Hi</button>\n\n";
        assert_eq!(extract_code(raw), "<button>Hi</button>");
        assert!(find_fenced_block(raw).is_none());
    }

    #[test]
    fn unclosed_fence_falls_back_to_whole_response() {
        let raw = "```jsx\nconst a = 1;\n";
        assert_eq!(extract_code(raw), raw.trim());
    }

    #[test]
    fn code_on_opening_line_is_kept() {
        let raw = "```const x = 1;\nconst y = 2;\n```";
        assert_eq!(extract_code(raw), "const x = 1;\nconst y = 2;");
    }

    #[test]
    fn info_string_metadata_is_not_code() {
        let raw = "```jsx title=\"Card.jsx\" live\n<div/>\n```";
        let block = find_fenced_block(raw).unwrap();

        assert_eq!(block.info, "jsx title=\"Card.jsx\" live");
        assert_eq!(block.language, Language::Jsx);
        assert_eq!(block.source, "<div/>");
    }

    #[test]
    fn assignment_on_opening_line_is_kept() {
        let raw = "```let total = 1\ntotal += 1\n```";
        assert_eq!(extract_code(raw), "let total = 1\ntotal += 1");
    }

    #[test]
    fn single_line_block() {
        assert_eq!(extract_code("```<b>bold</b>```"), "<b>bold</b>");
    }

    #[test]
    fn extraction_is_idempotent_without_fences() {
        for raw in ["plain text", "  <div>\n</div>  ", "", "\n\n"] {
            let once = extract_code(raw);
            assert_eq!(extract_code(&once), once);
            assert_eq!(once, raw.trim());
        }
    }

    #[test]
    fn never_panics_on_malformed_input() {
        for raw in ["```", "``````", "```\n", "a```b", "```é\n```", "````\n````"] {
            let _ = extract_code(raw);
        }
    }

    #[test]
    fn editor_hints() {
        assert_eq!(Language::Jsx.editor_hint(), "javascript");
        assert_eq!(Language::Unknown.editor_hint(), "html");
    }
}
