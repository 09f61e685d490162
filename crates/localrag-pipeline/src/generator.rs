//! A template-matching answer generator that needs no language model.
//!
//! It reads the context section back out of a prompt built by
//! [`compose_prompt`](crate::context::compose_prompt) and answers with the
//! context block sharing the most words with the question.

use std::collections::HashSet;

use async_trait::async_trait;

use localrag_core::config::NO_CONTEXT_SENTINEL;
use localrag_core::error::GenerationError;
use localrag_core::traits::AnswerGenerator;

use crate::context::{CONTEXT_HEADER, QUESTION_HEADER, ANSWER_HEADER};

pub const DECLINE_ANSWER: &str = "I don't know based on the provided documents.";

pub struct ExtractiveGenerator {
    sentinel: String,
    delimiter: String,
}

impl Default for ExtractiveGenerator {
    fn default() -> Self {
        Self::new(NO_CONTEXT_SENTINEL, "\n\n")
    }
}

impl ExtractiveGenerator {
    pub fn new(sentinel: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self { sentinel: sentinel.into(), delimiter: delimiter.into() }
    }

    fn sections<'a>(&self, prompt: &'a str) -> Option<(&'a str, &'a str)> {
        let (_, rest) = prompt.split_once(CONTEXT_HEADER)?;
        let (context, rest) = rest.split_once(QUESTION_HEADER)?;
        let question = rest.strip_suffix(ANSWER_HEADER).unwrap_or(rest);
        Some((context, question))
    }
}

fn words(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let (context, question) = self
            .sections(prompt)
            .ok_or_else(|| GenerationError::Failed("prompt has no context/question sections".to_string()))?;
        let context = context.trim();
        if context.is_empty() || context == self.sentinel {
            return Ok(DECLINE_ANSWER.to_string());
        }

        let question_words = words(question);
        let mut best: Option<(&str, usize)> = None;
        for block in context.split(self.delimiter.as_str()).map(str::trim).filter(|b| !b.is_empty()) {
            let overlap = words(block).intersection(&question_words).count();
            if best.map_or(true, |(_, top)| overlap > top) {
                best = Some((block, overlap));
            }
        }
        match best {
            Some((block, overlap)) if overlap > 0 => Ok(block.to_string()),
            _ => Ok(DECLINE_ANSWER.to_string()),
        }
    }
}
