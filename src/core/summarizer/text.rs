use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?[a-z][a-z0-9]*(?:\s[^>]*)?/?>").expect("valid html tag pattern")
});
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d{4}(?:[ \-]\d{1,2}[ \-]\d{1,2})?[ \t]*$").expect("valid date line pattern")
});
// Byline and photo credit lines ("Text: ...", "Foto: ...", "Bild: ...")
static BYLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^.*\b(?:text|foto|bild):.*$").expect("valid byline pattern")
});
static READ_MORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)läs mer:.*$").expect("valid read more pattern"));
// WordPress excerpt marker, "[…]" or "[...]"
static EXCERPT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(?:…|\.\.\.)\s*\]").expect("valid excerpt marker pattern"));
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://\S*[^\s.,;:!?)\]"']"#).expect("valid url pattern")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").expect("valid email pattern")
});
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("valid sentence end pattern"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

// Wide enough that html2text never wraps a paragraph; lines are sentence boundaries.
const RENDER_WIDTH: usize = 10_000;

/// Markup is rendered to text block by block; plain text keeps its line
/// breaks and only has entities decoded.
fn to_plain_text(raw: &str) -> String {
    if HTML_TAG.is_match(raw) {
        html2text::from_read_with_decorator(raw.as_bytes(), RENDER_WIDTH, TrivialDecorator::new())
    } else {
        html_escape::decode_html_entities(raw).into_owned()
    }
}

/// Strips markup and feed noise, returning one normalised paragraph per line.
pub fn clean_text(raw: &str) -> String {
    let text = to_plain_text(raw);
    let text = DATE_LINE.replace_all(&text, "");
    let text = BYLINE.replace_all(&text, "");
    let text = READ_MORE.replace_all(&text, "");
    let text = EXCERPT_MARKER.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = EMAIL.replace_all(&text, "");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits cleaned text into sentences. Line breaks are hard boundaries;
/// terminal punctuation is kept on the sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let mut start = 0;
        for boundary in SENTENCE_END.find_iter(line) {
            push_sentence(&mut sentences, &line[start..boundary.end()]);
            start = boundary.end();
        }
        push_sentence(&mut sentences, &line[start..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let sentence = candidate.trim();
    if sentence.chars().any(char::is_alphanumeric) {
        sentences.push(sentence.to_string());
    }
}

pub fn tokenize(sentence: &str) -> Vec<String> {
    WORD.find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
