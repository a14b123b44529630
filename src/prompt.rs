use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const OPEN_TAG: &str = "##<Regex>##";
pub const CLOSE_TAG: &str = "##</Regex>##";

const POSITIVE_MARKER: &str = "+++";
const SECTION_DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExampleSet {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// Split an example file into its positive and negative lists.
///
/// Positives follow `+++` in the part before the first `---`; negatives are
/// the part after it. An empty section still yields one empty line.
pub fn parse_example_text(text: &str) -> ExampleSet {
    let mut parts = text.split(SECTION_DELIMITER);
    let head = parts.next().unwrap_or_default();
    let positive_part = head.split(POSITIVE_MARKER).nth(1).unwrap_or_default();
    let negative_part = parts.next().unwrap_or_default();

    ExampleSet {
        positive: split_lines(positive_part),
        negative: split_lines(negative_part),
    }
}

fn split_lines(section: &str) -> Vec<String> {
    section.trim().split('\n').map(str::to_string).collect()
}

pub fn parse_example_file(path: &Path) -> Result<ExampleSet> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(parse_example_text(&text))
}

/// Build the query prompt, or `None` when either list is longer than
/// `max_examples`. Lists are never truncated.
pub fn render_prompt(set: &ExampleSet, max_examples: usize) -> Option<String> {
    if set.positive.len() > max_examples || set.negative.len() > max_examples {
        return None;
    }
    Some(format!(
        "Act as a Software Engineer. Create a regular expression in Python that matches strings \
         with a pattern similar to the examples: {positive}. The regular expression should \
         exclude strings with a pattern similar to the examples: {negative}. I need to parse \
         your response with a program, so please include your final solution regex between \
         these tags -> {OPEN_TAG}your regex{CLOSE_TAG}. Make the regular expression \
         generalizable to similar strings. Use Python to test that the Regex matches the \
         positive examples and does not match the negative examples.",
        positive = python_list(&set.positive),
        negative = python_list(&set.negative),
    ))
}

/// Render strings the way Python prints a list of them: `['a', "b'c"]`.
fn python_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| python_str(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn python_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
