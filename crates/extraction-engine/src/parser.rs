//! Rule-driven field extraction over a logical form's page text.

use shared_types::{
    ConsultationRecord, FieldConflict, FieldExtraction, FieldId, PageText,
};
use tracing::debug;

use crate::cleanup::clean_line;
use crate::default_rules::default_rules;
use crate::rules::{CleanPage, CompiledRuleSet};

pub struct FieldParser {
    rules: CompiledRuleSet,
}

impl FieldParser {
    pub fn new(rules: CompiledRuleSet) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        let compiled =
            CompiledRuleSet::compile(default_rules()).expect("built-in rules always compile");
        Self::new(compiled)
    }

    /// Extract one record from the ordered pages of a logical form.
    ///
    /// Per field: rules run in declared order and the first rule with a
    /// non-empty match wins, stamping its confidence tier. Within the
    /// winning rule the earliest (page, line) occurrence is the value;
    /// a differing value on a later page is recorded as a conflict, never
    /// auto-resolved. Unmatched fields stay in the output with an explicit
    /// absent value. Deterministic: the same pages always produce an
    /// identical record.
    pub fn parse(
        &self,
        document_id: &str,
        form_index: usize,
        pages: &[PageText],
    ) -> (ConsultationRecord, Vec<FieldExtraction>) {
        let clean: Vec<CleanPage> = pages
            .iter()
            .map(|page| CleanPage {
                page_index: page.page_index,
                lines: page.lines.iter().map(|line| clean_line(line)).collect(),
            })
            .collect();

        let mut record = ConsultationRecord::new(document_id, form_index);
        let mut extractions = Vec::with_capacity(FieldId::ALL.len());

        for field in FieldId::ALL {
            let extraction = self.extract_field(field, &clean);
            if let Some(value) = &extraction.value {
                record.set(field, value.clone());
            }
            extractions.push(extraction);
        }

        (record, extractions)
    }

    fn extract_field(&self, field: FieldId, pages: &[CleanPage]) -> FieldExtraction {
        for rule in self.rules.rules_for(field) {
            let candidates = rule.first_match_per_page(pages);
            let Some(winner) = candidates.first() else {
                continue;
            };

            let value = rule.interpret(&winner.raw);
            let winner_rendering = value.render();
            let conflict = candidates[1..].iter().find_map(|candidate| {
                let rendering = rule.interpret(&candidate.raw).render();
                (rendering != winner_rendering).then(|| FieldConflict {
                    page_index: candidate.page_index,
                    value: rendering,
                })
            });

            debug!(
                field = %field,
                rule = %rule.rule.name,
                page = winner.page_index,
                conflicted = conflict.is_some(),
                "field matched"
            );

            return FieldExtraction {
                field,
                value: Some(value),
                raw: Some(winner.raw.clone()),
                confidence: rule.rule.confidence,
                page_index: Some(winner.page_index),
                line_index: Some(winner.line_index),
                rule: Some(rule.rule.name.clone()),
                conflict,
            };
        }

        FieldExtraction::unmatched(field)
    }
}
