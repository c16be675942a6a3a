//! Translation facades and the external result envelopes.
//!
//! [`SiemConverter::translate`] is the API boundary: every core failure is
//! converted into a `(status=false, error_info)` envelope so external
//! callers never see a panic or a raw error type. Renderer diagnostics alone
//! do not fail a translation — they ride along in the envelope.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::cti::{iocs_chunks, CtiParser, IocParseOptions, CTI_IOCS_PER_QUERY_LIMIT};
use crate::error::{Diagnostic, TranslateError};
use crate::managers::{PlatformDetails, PlatformRegistry};
use crate::platforms::build_registry;
use crate::render::RenderedOutput;

/// The per-request output envelope for query/rule translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// True on success. Renderer diagnostics alone do not clear this flag.
    pub status: bool,
    /// Translated text on success, error info otherwise.
    pub result: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    pub fn from_error(error: &TranslateError) -> Self {
        Self {
            status: false,
            result: error.to_string(),
            diagnostics: Vec::new(),
        }
    }
}

impl From<RenderedOutput> for Translation {
    fn from(output: RenderedOutput) -> Self {
        Self {
            status: true,
            result: output.text,
            diagnostics: output.diagnostics,
        }
    }
}

/// The per-request output envelope for CTI conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CtiTranslation {
    pub status: bool,
    /// One rendered query per IOC chunk.
    pub queries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CtiTranslation {
    pub fn from_error(error: &TranslateError) -> Self {
        Self {
            status: false,
            queries: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Query and rule translation facade.
pub struct SiemConverter {
    registry: Arc<PlatformRegistry>,
}

impl Default for SiemConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiemConverter {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(build_registry()),
        }
    }

    pub fn with_registry(registry: Arc<PlatformRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PlatformRegistry> {
        &self.registry
    }

    fn try_translate(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<RenderedOutput, TranslateError> {
        let parser = self.registry.parser(source)?;
        let render = self.registry.render(target)?;
        debug!(%source, %target, "translating");
        let container = parser.parse(text)?;
        render.generate(&container)
    }

    /// The API boundary: all core failures become `(false, error_info)`.
    pub fn translate(&self, source: &str, target: &str, text: &str) -> Translation {
        match self.try_translate(source, target, text) {
            Ok(output) => output.into(),
            Err(error) => Translation::from_error(&error),
        }
    }

    /// Strict mode: any renderer diagnostic fails the translation.
    pub fn translate_strict(&self, source: &str, target: &str, text: &str) -> Translation {
        match self.try_translate(source, target, text) {
            Ok(output) if output.diagnostics.is_empty() => output.into(),
            Ok(output) => {
                let summary = output
                    .diagnostics
                    .iter()
                    .map(|d| d.message.clone())
                    .collect::<Vec<_>>()
                    .join("; ");
                Translation::from_error(&TranslateError::StrictRender(summary))
            }
            Err(error) => Translation::from_error(&error),
        }
    }

    pub fn parsers(&self) -> Vec<&PlatformDetails> {
        self.registry.parser_details()
    }

    pub fn renders(&self) -> Vec<&PlatformDetails> {
        self.registry.render_details()
    }
}

/// CTI conversion facade.
pub struct CtiConverter {
    registry: Arc<PlatformRegistry>,
    parser: CtiParser,
}

impl Default for CtiConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CtiConverter {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(build_registry()))
    }

    pub fn with_registry(registry: Arc<PlatformRegistry>) -> Self {
        Self {
            registry,
            parser: CtiParser::new(),
        }
    }

    fn try_convert(
        &self,
        text: &str,
        platform: &str,
        options: &IocParseOptions,
        iocs_per_query: usize,
    ) -> Result<Vec<String>, TranslateError> {
        let render = self.registry.cti_render(platform)?;
        let parsed = self.parser.iocs_from_string(text, options)?;
        let chunks = iocs_chunks(&parsed, render.mapping(), iocs_per_query);
        Ok(render.render(&chunks))
    }

    /// Converts indicator text into per-chunk hunting queries for one
    /// platform, with the default chunk size.
    pub fn convert(&self, text: &str, platform: &str, options: &IocParseOptions) -> CtiTranslation {
        self.convert_chunked(text, platform, options, CTI_IOCS_PER_QUERY_LIMIT)
    }

    pub fn convert_chunked(
        &self,
        text: &str,
        platform: &str,
        options: &IocParseOptions,
        iocs_per_query: usize,
    ) -> CtiTranslation {
        match self.try_convert(text, platform, options, iocs_per_query) {
            Ok(queries) => CtiTranslation {
                status: true,
                queries,
                error: None,
            },
            Err(error) => CtiTranslation::from_error(&error),
        }
    }

    pub fn renders(&self) -> Vec<&PlatformDetails> {
        self.registry.cti_render_details()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_platform_reports_error_envelope() {
        let converter = SiemConverter::new();
        let translation = converter.translate("no-such-platform", "splunk-spl-query", "a=1");
        assert!(!translation.status);
        assert!(translation.result.contains("no-such-platform"));
    }

    #[test]
    fn unknown_cti_platform_reports_error_envelope() {
        let converter = CtiConverter::new();
        let result = converter.convert("8.8.8.8", "no-such-platform", &IocParseOptions::default());
        assert!(!result.status);
        assert!(result.error.unwrap().contains("no-such-platform"));
    }
}
