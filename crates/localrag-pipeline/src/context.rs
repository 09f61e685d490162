//! Context block assembly and prompt composition.

use localrag_core::types::ScoredFragment;

pub const PREAMBLE: &str = "You are a helpful assistant. Answer the question using only the \
information in the context below. If the context does not contain enough information to \
answer, say that you do not know instead of guessing.";
pub const CONTEXT_HEADER: &str = "Context:\n";
pub const QUESTION_HEADER: &str = "\n\nQuestion: ";
pub const ANSWER_HEADER: &str = "\n\nAnswer:";

/// Retrieved text as presented to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub text: String,
    /// How many leading hits made it into `text`.
    pub fragments_used: usize,
    /// The first hit alone exceeded the budget and was cut.
    pub truncated: bool,
}

/// Join hit texts in rank order with `delimiter`, stopping before the total
/// would exceed `max_chars`. With no usable hits the text is `sentinel`.
pub fn build_context(hits: &[ScoredFragment], delimiter: &str, max_chars: usize, sentinel: &str) -> Context {
    let delimiter_len = delimiter.chars().count();
    let mut text = String::new();
    let mut used_chars = 0;
    let mut fragments_used = 0;
    let mut truncated = false;

    for hit in hits {
        let fragment = hit.fragment.text.as_str();
        let sep = if fragments_used == 0 { 0 } else { delimiter_len };
        let len = fragment.chars().count();
        if used_chars + sep + len > max_chars {
            if fragments_used == 0 {
                text.push_str(truncate_chars(fragment, max_chars));
                fragments_used = 1;
                truncated = true;
            }
            break;
        }
        if fragments_used > 0 {
            text.push_str(delimiter);
        }
        text.push_str(fragment);
        used_chars += sep + len;
        fragments_used += 1;
    }

    if text.is_empty() {
        text = sentinel.to_string();
        fragments_used = 0;
    }
    Context { text, fragments_used, truncated }
}

/// The full prompt: preamble, context section, then the question.
pub fn compose_prompt(context: &str, query: &str) -> String {
    format!("{PREAMBLE}\n\n{CONTEXT_HEADER}{context}{QUESTION_HEADER}{query}{ANSWER_HEADER}")
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
