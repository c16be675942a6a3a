//! The renderer engine: IR token stream to target-dialect text.
//!
//! [`QueryRender`] carries a default walk over the flat token stream; a
//! platform supplies its logical-operator spellings and a
//! `field_value_render` hook for one comparison. Non-fatal findings
//! (unmapped fields, functions the target cannot express) accumulate as
//! [`Diagnostic`] values in the output envelope — rendering itself stays
//! best-effort.

use tracing::debug;

use crate::error::{diagnostic_codes, Diagnostic, TranslateError};
use crate::ir::{
    Field, Keyword, OperatorKind, ParsedFunctions, SiemContainer, Token, TokenKind, Value,
};
use crate::managers::PlatformDetails;
use crate::mapping::{PlatformMappings, SourceMapping};

/// Rendered target text plus the diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            diagnostics: Vec::new(),
        }
    }
}

/// A target dialect renderer.
pub trait QueryRender: Send + Sync {
    fn details(&self) -> &PlatformDetails;

    fn mappings(&self) -> &PlatformMappings;

    /// Spelling of the logical AND joiner. An empty string means the dialect
    /// joins conjuncts with bare whitespace (Splunk).
    fn and_token(&self) -> &'static str {
        "AND"
    }

    fn or_token(&self) -> &'static str {
        "OR"
    }

    fn not_token(&self) -> &'static str {
        "NOT"
    }

    /// Whether the dialect has a native multi-value membership operator.
    /// Dialects without one get `IN` expanded into an OR-disjunction.
    fn supports_in_operator(&self) -> bool {
        true
    }

    /// Renders one comparison against an already-resolved target field name.
    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError>;

    /// Renders a bare keyword. Default: double-quoted term.
    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!("\"{}\"", keyword.value))
    }

    /// Resolves the target platform's spelling for a field under the chosen
    /// mapping. Unresolvable fields render with their generic/source name and
    /// attach an `UNMAPPED_FIELD` diagnostic.
    fn target_field_name(
        &self,
        field: &Field,
        mapping: &SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let generic = field.generic_name(&mapping.source_id);
        match mapping.platform_field(generic) {
            Some(platform) => platform.to_string(),
            None => {
                diagnostics.push(Diagnostic::warning(
                    diagnostic_codes::UNMAPPED_FIELD,
                    format!(
                        "field `{}` has no `{}` mapping for source `{}`",
                        field.source_name,
                        self.details().siem_type,
                        mapping.source_id
                    ),
                ));
                generic.to_string()
            }
        }
    }

    /// Renders a full [`crate::ir::FieldValue`], expanding list values into
    /// OR-disjunctions where the operator or dialect requires it.
    fn render_field_value(
        &self,
        fv: &crate::ir::FieldValue,
        mapping: &SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let target = self.target_field_name(&fv.field, mapping, diagnostics);
        let operator = fv.operator_kind();

        if operator == OperatorKind::In && !self.supports_in_operator() {
            let parts = fv
                .value
                .scalars()
                .into_iter()
                .map(|scalar| {
                    self.field_value_render(&target, OperatorKind::Eq, scalar, diagnostics)
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(format!("({})", parts.join(&format!(" {} ", self.or_token()))));
        }

        match (&fv.value, operator.is_multi_value()) {
            (Value::List(items), false) => {
                let parts = items
                    .iter()
                    .map(|scalar| self.field_value_render(&target, operator, scalar, diagnostics))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(&format!(" {} ", self.or_token()))))
            }
            _ => self.field_value_render(&target, operator, &fv.value, diagnostics),
        }
    }

    /// Default walk over the flat token stream. Parentheses bind tight; an
    /// empty logical spelling joins with bare whitespace.
    fn render_token_stream(
        &self,
        tokens: &[Token],
        mapping: &SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let mut out = String::new();
        let mut needs_space = false;
        for token in tokens {
            let piece = match token {
                Token::Identifier(id) => match id.kind {
                    TokenKind::And => self.and_token().to_string(),
                    TokenKind::Or => self.or_token().to_string(),
                    TokenKind::Not => self.not_token().to_string(),
                    TokenKind::LParen => "(".to_string(),
                    TokenKind::RParen => ")".to_string(),
                    TokenKind::Op(op) => {
                        return Err(TranslateError::UnsupportedOperator(op.to_string()))
                    }
                },
                Token::FieldValue(fv) => self.render_field_value(fv, mapping, diagnostics)?,
                Token::Keyword(kw) => self.keyword_render(kw, diagnostics)?,
            };
            if piece.is_empty() {
                continue;
            }
            if !out.is_empty() && needs_space && piece != ")" {
                out.push(' ');
            }
            out.push_str(&piece);
            needs_space = piece != "(";
        }
        Ok(out)
    }

    /// Renders the function pipeline tail. The default cannot express any
    /// function: everything becomes an `UNSUPPORTED_FUNCTION` diagnostic.
    fn render_functions(
        &self,
        functions: &ParsedFunctions,
        _mapping: &SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        for function in &functions.functions {
            diagnostics.push(Diagnostic::warning(
                diagnostic_codes::UNSUPPORTED_FUNCTION,
                format!(
                    "function `{}` is not supported by {}",
                    function.name,
                    self.details().siem_type
                ),
            ));
        }
        for name in &functions.not_supported {
            diagnostics.push(Diagnostic::warning(
                diagnostic_codes::UNMAPPED_FUNCTION,
                format!("function `{name}` was not recognized in the source query"),
            ));
        }
        String::new()
    }

    /// Assembles the final query text from the optional log-source prefix,
    /// the rendered boolean body, and the function tail.
    fn finalize_query(&self, log_source: Option<&str>, body: String, functions_tail: String) -> String {
        let mut out = String::new();
        if let Some(prefix) = log_source {
            if !prefix.is_empty() {
                out.push_str(prefix);
            }
        }
        if !body.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&body);
        }
        if !functions_tail.is_empty() {
            out.push_str(&functions_tail);
        }
        out
    }

    /// Full render of a translation unit.
    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        let mut diagnostics = Vec::new();
        let mapping = self
            .mappings()
            .first_suitable(&container.meta_info.source_mapping_ids);
        debug!(
            target_platform = %self.details().siem_type,
            mapping = %mapping.source_id,
            "rendering translation unit"
        );
        let body = self.render_token_stream(&container.tokens, mapping, &mut diagnostics)?;
        let tail = self.render_functions(&container.functions, mapping, &mut diagnostics);
        let text = self.finalize_query(mapping.default_log_source.as_deref(), body, tail);
        Ok(RenderedOutput {
            text,
            diagnostics,
        })
    }
}

/// Joins rule metadata into the single description sentence rule documents
/// carry: description, author, rule id, license, MITRE ATT&CK line, and
/// references, each terminated with a period.
pub fn rule_description_str(meta: &crate::ir::MetaInfoContainer) -> String {
    let mut sentences: Vec<String> = Vec::new();
    if !meta.description.is_empty() {
        let mut description = meta.description.clone();
        if !description.ends_with('.') {
            description.push('.');
        }
        sentences.push(description);
    }
    if !meta.author.is_empty() {
        sentences.push(format!("Author: {}.", meta.author));
    }
    sentences.push(format!("Rule ID: {}.", meta.id));
    if !meta.license.is_empty() {
        sentences.push(format!("License: {}.", meta.license));
    }
    if !meta.mitre_attack.is_empty() {
        let mut entries: Vec<String> = Vec::new();
        for (tactic, techniques) in &meta.mitre_attack {
            entries.push(tactic.to_uppercase());
            entries.extend(techniques.iter().map(|t| t.to_uppercase()));
        }
        sentences.push(format!("MITRE ATT&CK: {}.", entries.join(", ")));
    }
    if !meta.references.is_empty() {
        sentences.push(format!("References: {}.", meta.references.join(", ")));
    }
    sentences.join(" ")
}
