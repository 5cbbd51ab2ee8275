//! Declarative extraction rules.
//!
//! A rule is data (pattern + field + confidence tier + optional
//! normalizer), so rule sets can be supplied from configuration without
//! touching parser or orchestration code. Rules compile once into anchored
//! regex matchers; evaluation order within a field is declaration order,
//! most specific first.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use shared_types::{Confidence, FieldId, FieldValue};
use thiserror::Error;

use crate::normalize::{self, Normalizer};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{rule}' has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule '{rule}' lists no options")]
    EmptyOptions { rule: String },
}

/// Vertical slice of a page a positional rule is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRegion {
    Top,
    Middle,
    Bottom,
    Any,
}

impl PageRegion {
    /// Line range covered on a page of `line_count` lines.
    fn line_range(self, line_count: usize) -> std::ops::Range<usize> {
        let third = line_count.div_ceil(3);
        match self {
            PageRegion::Top => 0..third.min(line_count),
            PageRegion::Middle => third.min(line_count)..(2 * third).min(line_count),
            PageRegion::Bottom => (line_count.saturating_sub(third))..line_count,
            PageRegion::Any => 0..line_count,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RulePattern {
    /// Label-anchored (or otherwise self-contained) pattern applied per
    /// line; capture group 1 is the value, the whole match if absent.
    AnchoredPattern { pattern: String },
    /// A keyword line, with the value matched within the next `window`
    /// lines (inclusive of the keyword line).
    ProximityKeyword {
        keyword: String,
        value_pattern: String,
        window: usize,
    },
    /// Pattern applied to the joined text of one region of the page; may
    /// span lines with an inline `(?s)` flag.
    PositionalRegion { region: PageRegion, pattern: String },
    /// Checkbox/radio group: the value is the canonical text of whichever
    /// option carries a selection mark.
    CheckedOption { options: Vec<String> },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExtractionRule {
    pub name: String,
    pub field: FieldId,
    pub confidence: Confidence,
    pub pattern: RulePattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<Normalizer>,
}

/// One candidate occurrence of a field value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub page_index: usize,
    pub line_index: usize,
    pub raw: String,
}

/// A page after cleanup, ready for matching.
#[derive(Debug, Clone)]
pub(crate) struct CleanPage {
    pub page_index: usize,
    pub lines: Vec<String>,
}

#[derive(Debug)]
enum Matcher {
    Anchored {
        regex: Regex,
    },
    Proximity {
        keyword: String,
        value: Regex,
        window: usize,
    },
    Positional {
        region: PageRegion,
        regex: Regex,
    },
    Checked {
        options: Vec<(String, Regex)>,
    },
}

#[derive(Debug)]
pub struct CompiledRule {
    pub rule: ExtractionRule,
    matcher: Matcher,
}

fn build_regex(rule: &str, pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            rule: rule.to_string(),
            source,
        })
}

/// Selection marks the engine produces for a ticked box: an x, a check, or
/// a crossed square, guarded so a trailing x inside a word never counts.
fn mark_regex(rule: &str, option: &str) -> Result<Regex, RuleError> {
    let escaped = regex::escape(option);
    build_regex(
        rule,
        &format!(r"(?:^|[\s\[\(])[x✓☒⌧][\]\)]?\s*{escaped}\b|\b{escaped}\s*[\[\(]?[x✓☒⌧](?:[\s\]\)]|$)"),
    )
}

impl CompiledRule {
    fn compile(rule: ExtractionRule) -> Result<Self, RuleError> {
        let matcher = match &rule.pattern {
            RulePattern::AnchoredPattern { pattern } => Matcher::Anchored {
                regex: build_regex(&rule.name, pattern)?,
            },
            RulePattern::ProximityKeyword {
                keyword,
                value_pattern,
                window,
            } => Matcher::Proximity {
                keyword: keyword.to_lowercase(),
                value: build_regex(&rule.name, value_pattern)?,
                window: *window,
            },
            RulePattern::PositionalRegion { region, pattern } => Matcher::Positional {
                region: *region,
                regex: build_regex(&rule.name, pattern)?,
            },
            RulePattern::CheckedOption { options } => {
                if options.is_empty() {
                    return Err(RuleError::EmptyOptions {
                        rule: rule.name.clone(),
                    });
                }
                let options = options
                    .iter()
                    .map(|option| Ok((option.clone(), mark_regex(&rule.name, option)?)))
                    .collect::<Result<Vec<_>, RuleError>>()?;
                Matcher::Checked { options }
            }
        };
        Ok(Self { rule, matcher })
    }

    /// The earliest match on each page, in page order. The head of the
    /// returned list is the winning candidate; later entries exist only to
    /// detect cross-page conflicts.
    pub(crate) fn first_match_per_page(&self, pages: &[CleanPage]) -> Vec<Candidate> {
        pages
            .iter()
            .filter_map(|page| self.first_match_on_page(page))
            .collect()
    }

    fn first_match_on_page(&self, page: &CleanPage) -> Option<Candidate> {
        match &self.matcher {
            Matcher::Anchored { regex } => page.lines.iter().enumerate().find_map(|(i, line)| {
                capture_value(regex, line).map(|raw| Candidate {
                    page_index: page.page_index,
                    line_index: i,
                    raw,
                })
            }),
            Matcher::Proximity {
                keyword,
                value,
                window,
            } => {
                for (i, line) in page.lines.iter().enumerate() {
                    if !line.to_lowercase().contains(keyword) {
                        continue;
                    }
                    let end = (i + window + 1).min(page.lines.len());
                    for (j, candidate_line) in page.lines[i..end].iter().enumerate() {
                        if let Some(raw) = capture_value(value, candidate_line) {
                            return Some(Candidate {
                                page_index: page.page_index,
                                line_index: i + j,
                                raw,
                            });
                        }
                    }
                }
                None
            }
            Matcher::Positional { region, regex } => {
                let range = region.line_range(page.lines.len());
                let start = range.start;
                let joined = page.lines[range].join("\n");
                let captures = regex.captures(&joined)?;
                let matched = captures.get(1).or_else(|| captures.get(0))?;
                let raw = matched.as_str().trim().to_string();
                if raw.is_empty() {
                    return None;
                }
                let line_offset = joined[..matched.start()].matches('\n').count();
                Some(Candidate {
                    page_index: page.page_index,
                    line_index: start + line_offset,
                    raw,
                })
            }
            Matcher::Checked { options } => {
                for (i, line) in page.lines.iter().enumerate() {
                    for (canonical, regex) in options {
                        if regex.is_match(line) {
                            return Some(Candidate {
                                page_index: page.page_index,
                                line_index: i,
                                raw: canonical.clone(),
                            });
                        }
                    }
                }
                None
            }
        }
    }

    /// Turn matched text into a typed value. Checkbox matches are already
    /// canonical option text; everything else goes through the rule's
    /// normalizer.
    pub(crate) fn interpret(&self, raw: &str) -> FieldValue {
        if matches!(self.matcher, Matcher::Checked { .. }) {
            return FieldValue::Choice(raw.to_string());
        }
        normalize::apply(self.rule.normalizer, raw)
    }
}

fn capture_value(regex: &Regex, line: &str) -> Option<String> {
    let captures = regex.captures(line)?;
    let matched = captures.get(1).or_else(|| captures.get(0))?;
    let raw = matched.as_str().trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// All rules for the schema, compiled and grouped by target field.
pub struct CompiledRuleSet {
    by_field: BTreeMap<FieldId, Vec<CompiledRule>>,
}

impl CompiledRuleSet {
    pub fn compile(rules: Vec<ExtractionRule>) -> Result<Self, RuleError> {
        let mut by_field: BTreeMap<FieldId, Vec<CompiledRule>> = BTreeMap::new();
        for rule in rules {
            by_field
                .entry(rule.field)
                .or_default()
                .push(CompiledRule::compile(rule)?);
        }
        Ok(Self { by_field })
    }

    pub(crate) fn rules_for(&self, field: FieldId) -> &[CompiledRule] {
        self.by_field.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rule_count(&self) -> usize {
        self.by_field.values().map(Vec::len).sum()
    }
}
