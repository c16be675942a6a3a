//! The Sigma rule renderer: IR back to a YAML rule document.
//!
//! Every leaf of the token stream becomes its own named selection; the
//! condition string mirrors the stream's boolean structure over those
//! names. Negated equality renders as a positive selection referenced with
//! `not` in the condition.

use serde_yaml::{Mapping, Value as Yaml};

use super::consts::sigma_rule_details;
use super::mapping::sigma_mappings;
use crate::error::{Diagnostic, TranslateError};
use crate::ir::{OperatorKind, SiemContainer, Token, TokenKind, Value};
use crate::managers::PlatformDetails;
use crate::mapping::PlatformMappings;
use crate::render::{QueryRender, RenderedOutput};

pub struct SigmaRender {
    details: PlatformDetails,
}

impl Default for SigmaRender {
    fn default() -> Self {
        Self::new()
    }
}

impl SigmaRender {
    pub fn new() -> Self {
        Self {
            details: sigma_rule_details(),
        }
    }

    fn selection_key(field: &str, operator: OperatorKind) -> Result<String, TranslateError> {
        let suffix = match operator {
            OperatorKind::Eq | OperatorKind::NotEq | OperatorKind::In => "",
            OperatorKind::Contains => "|contains",
            OperatorKind::StartsWith => "|startswith",
            OperatorKind::EndsWith => "|endswith",
            OperatorKind::Regex => "|re",
            OperatorKind::Gt => "|gt",
            OperatorKind::Gte => "|gte",
            OperatorKind::Lt => "|lt",
            OperatorKind::Lte => "|lte",
            OperatorKind::Keyword => {
                return Err(TranslateError::UnsupportedOperator(
                    "keyword operator cannot qualify a field".to_string(),
                ))
            }
        };
        Ok(format!("{field}{suffix}"))
    }

    fn yaml_value(value: &Value) -> Yaml {
        match value {
            Value::Num(num) => Yaml::Number((*num).into()),
            Value::Str(text) => Yaml::String(text.clone()),
            Value::List(items) => Yaml::Sequence(items.iter().map(Self::yaml_value).collect()),
        }
    }
}

impl QueryRender for SigmaRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        sigma_mappings()
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "{}: {value}",
            Self::selection_key(target_field, operator)?
        ))
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        let mut diagnostics = Vec::new();
        let mapping = self
            .mappings()
            .first_suitable(&container.meta_info.source_mapping_ids);

        let mut detection = Mapping::new();
        let mut keywords: Vec<Yaml> = Vec::new();
        let mut condition = String::new();
        let mut needs_space = false;

        let mut push_piece = |condition: &mut String, piece: &str, needs_space: &mut bool| {
            if !condition.is_empty() && *needs_space && piece != ")" {
                condition.push(' ');
            }
            condition.push_str(piece);
            *needs_space = piece != "(";
        };

        for token in &container.tokens {
            match token {
                Token::Identifier(id) => {
                    let piece = match id.kind {
                        TokenKind::And => "and",
                        TokenKind::Or => "or",
                        TokenKind::Not => "not",
                        TokenKind::LParen => "(",
                        TokenKind::RParen => ")",
                        TokenKind::Op(op) => {
                            return Err(TranslateError::UnsupportedOperator(op.to_string()))
                        }
                    };
                    push_piece(&mut condition, piece, &mut needs_space);
                }
                Token::FieldValue(fv) => {
                    let name = format!("selection_{}", detection.len());
                    let field = self.target_field_name(&fv.field, mapping, &mut diagnostics);
                    let operator = fv.operator_kind();
                    let key = Self::selection_key(&field, operator)?;
                    let mut entry = Mapping::new();
                    entry.insert(Yaml::String(key), Self::yaml_value(&fv.value));
                    detection.insert(Yaml::String(name.clone()), Yaml::Mapping(entry));
                    if operator == OperatorKind::NotEq {
                        push_piece(&mut condition, &format!("not {name}"), &mut needs_space);
                    } else {
                        push_piece(&mut condition, &name, &mut needs_space);
                    }
                }
                Token::Keyword(kw) => {
                    // bare terms all live in the one keyword selection
                    push_piece(&mut condition, "keywords", &mut needs_space);
                    keywords.push(Yaml::String(kw.value.clone()));
                }
            }
        }
        if !keywords.is_empty() {
            detection.insert(Yaml::String("keywords".to_string()), Yaml::Sequence(keywords));
        }
        detection.insert(
            Yaml::String("condition".to_string()),
            Yaml::String(condition),
        );

        let meta = &container.meta_info;
        let mut logsource = Mapping::new();
        for (key, values) in &mapping.log_source_signature {
            if let Some(value) = values.first() {
                logsource.insert(
                    Yaml::String(key.clone()),
                    Yaml::String(value.clone()),
                );
            }
        }

        let mut tags: Vec<Yaml> = meta.tags.iter().cloned().map(Yaml::String).collect();
        if tags.is_empty() {
            for (tactic, techniques) in &meta.mitre_attack {
                tags.push(Yaml::String(format!("attack.{tactic}")));
                tags.extend(
                    techniques
                        .iter()
                        .map(|technique| Yaml::String(format!("attack.{technique}"))),
                );
            }
        }

        let mut rule = Mapping::new();
        rule.insert(
            Yaml::String("title".to_string()),
            Yaml::String(meta.title.clone()),
        );
        rule.insert(Yaml::String("id".to_string()), Yaml::String(meta.id.clone()));
        rule.insert(
            Yaml::String("status".to_string()),
            Yaml::String(meta.status.clone()),
        );
        rule.insert(
            Yaml::String("description".to_string()),
            Yaml::String(meta.description.clone()),
        );
        if !meta.references.is_empty() {
            rule.insert(
                Yaml::String("references".to_string()),
                Yaml::Sequence(meta.references.iter().cloned().map(Yaml::String).collect()),
            );
        }
        rule.insert(
            Yaml::String("author".to_string()),
            Yaml::String(meta.author.clone()),
        );
        rule.insert(
            Yaml::String("date".to_string()),
            Yaml::String(meta.date.clone()),
        );
        if !tags.is_empty() {
            rule.insert(Yaml::String("tags".to_string()), Yaml::Sequence(tags));
        }
        if !logsource.is_empty() {
            rule.insert(
                Yaml::String("logsource".to_string()),
                Yaml::Mapping(logsource),
            );
        }
        rule.insert(
            Yaml::String("detection".to_string()),
            Yaml::Mapping(detection),
        );
        if !meta.false_positives.is_empty() {
            rule.insert(
                Yaml::String("falsepositives".to_string()),
                Yaml::Sequence(
                    meta.false_positives
                        .iter()
                        .cloned()
                        .map(Yaml::String)
                        .collect(),
                ),
            );
        }
        rule.insert(
            Yaml::String("level".to_string()),
            Yaml::String(meta.severity.to_string()),
        );

        let text = serde_yaml::to_string(&Yaml::Mapping(rule))
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput { text, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer};

    fn container(tokens: Vec<Token>) -> SiemContainer {
        let meta = MetaInfoContainer {
            title: "Suspicious process".to_string(),
            ..Default::default()
        };
        SiemContainer::new(tokens, meta)
    }

    #[test]
    fn renders_selection_and_condition() {
        let tokens = vec![
            Token::FieldValue(FieldValue::new(
                "EventID",
                Identifier::op(OperatorKind::Eq),
                Value::Num(4688),
            )),
            Token::Identifier(Identifier::and()),
            Token::FieldValue(FieldValue::new(
                "CommandLine",
                Identifier::op(OperatorKind::Contains),
                Value::Str("powershell".to_string()),
            )),
        ];
        let output = SigmaRender::new().generate(&container(tokens)).unwrap();
        assert!(output.text.contains("EventID: 4688"));
        assert!(output.text.contains("CommandLine|contains: powershell"));
        assert!(output.text.contains("condition: selection_0 and selection_1"));
        assert!(output.text.contains("level: low"));
    }

    #[test]
    fn not_eq_renders_as_negated_selection() {
        let tokens = vec![Token::FieldValue(FieldValue::new(
            "User",
            Identifier::op(OperatorKind::NotEq),
            Value::Str("SYSTEM".to_string()),
        ))];
        let output = SigmaRender::new().generate(&container(tokens)).unwrap();
        assert!(output.text.contains("condition: not selection_0"));
        assert!(output.text.contains("User: SYSTEM"));
    }

    #[test]
    fn keywords_collect_into_one_selection() {
        let tokens = vec![Token::Keyword(crate::ir::Keyword::new("mimikatz"))];
        let output = SigmaRender::new().generate(&container(tokens)).unwrap();
        assert!(output.text.contains("keywords:"));
        assert!(output.text.contains("- mimikatz"));
        assert!(output.text.contains("condition: keywords"));
    }
}
