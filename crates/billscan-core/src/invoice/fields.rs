//! Labeled scalar field extraction.

use std::cmp::Reverse;
use std::ops::Range;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::normalize::collapse_spaces;

use super::rules::patterns::{DATE_VALUE, FREE_TEXT_VALUE, IDENTIFIER_VALUE, LABEL_SEPARATOR};
use super::rules::{is_calendar_date, FieldRule, ValuePattern};

/// Result of applying one field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    /// Canonical field name.
    pub name: String,
    /// Captured value, `None` when no alias/value pair matched.
    pub value: Option<String>,
    /// Aliases that were searched, present whether or not a value was found.
    pub aliases: Vec<String>,
}

/// One occurrence of an alias in the text.
#[derive(Debug, Clone, Copy)]
struct LabelHit {
    rule: usize,
    alias: usize,
    start: usize,
    end: usize,
}

impl LabelHit {
    fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether `other` spans this hit and is strictly longer.
    fn is_covered_by(&self, other: &LabelHit) -> bool {
        other.start <= self.start && other.end >= self.end && other.len() > self.len()
    }
}

struct CompiledRule {
    rule: FieldRule,
    labels: Vec<Regex>,
}

/// Extracts scalar fields from normalized text using a table of rules.
///
/// For every rule the earliest alias occurrence (top to bottom) that is
/// followed by a value of the right shape wins. An alias occurrence that sits
/// inside a longer label belonging to another rule is ignored, so `Date`
/// never fires inside `Due Date`.
pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
}

impl FieldExtractor {
    /// Compile a set of field rules.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, ExtractionError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let labels = rule
                    .aliases
                    .iter()
                    .map(|alias| compile_label(alias))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|reason| ExtractionError::InvalidRule {
                        field: rule.name.clone(),
                        reason,
                    })?;
                Ok(CompiledRule { rule, labels })
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        Ok(Self { rules })
    }

    /// The rules this extractor applies, in order.
    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Produce one `ExtractedField` per rule, in rule order.
    pub fn extract(&self, text: &str) -> Vec<ExtractedField> {
        self.extract_outside(text, &[])
    }

    /// Like [`extract`](Self::extract), but alias occurrences that start
    /// inside any of `skipped` (byte ranges of `text`, e.g. table header
    /// lines) are not treated as labels.
    pub fn extract_outside(&self, text: &str, skipped: &[Range<usize>]) -> Vec<ExtractedField> {
        let mut hits = self.find_labels(text);
        hits.retain(|h| !skipped.iter().any(|r| r.contains(&h.start)));
        trace!("Found {} label occurrences", hits.len());

        let fields: Vec<ExtractedField> = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, compiled)| ExtractedField {
                name: compiled.rule.name.clone(),
                value: self.extract_value(index, text, &hits),
                aliases: compiled.rule.aliases.clone(),
            })
            .collect();

        debug!(
            "Extracted {}/{} fields",
            fields.iter().filter(|f| f.value.is_some()).count(),
            fields.len()
        );

        fields
    }

    fn find_labels(&self, text: &str) -> Vec<LabelHit> {
        let mut hits = Vec::new();
        for (rule, compiled) in self.rules.iter().enumerate() {
            for (alias, label) in compiled.labels.iter().enumerate() {
                hits.extend(label.find_iter(text).map(|m| LabelHit {
                    rule,
                    alias,
                    start: m.start(),
                    end: m.end(),
                }));
            }
        }
        hits
    }

    fn extract_value(&self, index: usize, text: &str, hits: &[LabelHit]) -> Option<String> {
        let compiled = &self.rules[index];

        let mut candidates: Vec<&LabelHit> = hits
            .iter()
            .filter(|h| h.rule == index)
            .filter(|h| {
                !hits
                    .iter()
                    .any(|other| other.rule != index && h.is_covered_by(other))
            })
            .collect();
        candidates.sort_by_key(|h| (h.start, Reverse(h.len()), h.alias));

        // Date tokens that are not real calendar dates are kept as a fallback
        // in case no later occurrence parses.
        let mut fallback: Option<String> = None;

        for hit in candidates {
            let rest = &text[hit.end..];
            let separator_len = LABEL_SEPARATOR.find(rest).map(|m| m.end()).unwrap_or(0);
            let value_text = &rest[separator_len..];

            let Some(value) = match_value(compiled.rule.pattern, value_text) else {
                continue;
            };

            if compiled.rule.pattern == ValuePattern::Date && !is_calendar_date(&value) {
                trace!("Field {} has non-calendar date {:?}", compiled.rule.name, value);
                fallback.get_or_insert(value);
                continue;
            }

            debug!(
                "Field {} matched via alias {:?} at offset {}",
                compiled.rule.name, compiled.rule.aliases[hit.alias], hit.start
            );
            return Some(value);
        }

        if fallback.is_none() {
            debug!("Field {} not found", compiled.rule.name);
        }
        fallback
    }
}

fn compile_label(alias: &str) -> Result<Regex, String> {
    let pattern = label_pattern(alias)?;
    Regex::new(&format!("(?i){pattern}")).map_err(|e| e.to_string())
}

/// Regex source for an alias: whole word at edges that are word characters,
/// internal spaces matching any run of horizontal whitespace. Case folding is
/// left to the caller.
pub(crate) fn label_pattern(alias: &str) -> Result<String, String> {
    let alias = alias.trim();
    if alias.is_empty() {
        return Err("empty alias".to_string());
    }

    let body = alias
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[ \t]+");

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if is_word(alias.chars().next()) { r"\b" } else { "" };
    let trail = if is_word(alias.chars().last()) { r"\b" } else { "" };

    Ok(format!("{lead}{body}{trail}"))
}

fn match_value(pattern: ValuePattern, text: &str) -> Option<String> {
    match pattern {
        ValuePattern::FreeText => {
            let caps = FREE_TEXT_VALUE.captures(text)?;
            let value = collapse_spaces(&caps[1]);
            (!value.is_empty()).then_some(value)
        }
        ValuePattern::Date => {
            let caps = DATE_VALUE.captures(text)?;
            Some(caps[1].to_string())
        }
        ValuePattern::Identifier => {
            let caps = IDENTIFIER_VALUE.captures(text)?;
            let value = caps[1].trim_end_matches(['.', ',', '-', '/']);
            value
                .chars()
                .any(|c| c.is_ascii_digit())
                .then(|| value.to_string())
        }
    }
}
