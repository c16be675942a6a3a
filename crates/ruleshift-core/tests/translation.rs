//! End-to-end translation scenarios across the registry.

use ruleshift_core::{SiemConverter, TranslateError};

fn converter() -> SiemConverter {
    SiemConverter::new()
}

#[test]
fn sigma_to_splunk_simple() {
    let rule = "title: Process creation\n\
                logsource:\n\
                \x20 product: windows\n\
                detection:\n\
                \x20 selection:\n\
                \x20   EventID: 4688\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"source="WinEventLog:*" EventCode=4688"#
    );
}

#[test]
fn sigma_contains_all_to_splunk() {
    let rule = "title: Encoded commands\n\
                detection:\n\
                \x20 selection:\n\
                \x20   CommandLine|contains|all:\n\
                \x20     - '-enc'\n\
                \x20     - 'powershell'\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"CommandLine="*-enc*" CommandLine="*powershell*""#
    );
}

#[test]
fn sigma_windash_expands_both_spellings() {
    let rule = "title: Windash\n\
                detection:\n\
                \x20 selection:\n\
                \x20   CommandLine|windash: '-verb'\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"(CommandLine="-verb" OR CommandLine="/verb")"#
    );
}

#[test]
fn kql_in_list_to_lucene_without_native_in() {
    let translation = converter().translate(
        "sentinel-kql-query",
        "elastic-lucene-query",
        "EventID in (4624, 4625)",
    );
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(translation.result, "(EventID:4624 OR EventID:4625)");
}

#[test]
fn sigma_to_sentinel_uses_table_prefix() {
    let rule = "title: Process creation\n\
                logsource:\n\
                \x20 product: windows\n\
                \x20 service: security\n\
                detection:\n\
                \x20 selection:\n\
                \x20   EventID: 4688\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "sentinel-kql-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(translation.result, "SecurityEvent | where EventID == 4688");
}

#[test]
fn splunk_to_sigma_round_trip_structure() {
    let translation = converter().translate(
        "splunk-spl-query",
        "sigma",
        r#"source="WinEventLog:Security" EventCode=4688"#,
    );
    assert!(translation.status, "failed: {}", translation.result);
    assert!(translation.result.contains("EventID: 4688"));
    assert!(translation.result.contains("condition: selection_0"));
}

#[test]
fn sigma_condition_grammar_one_of() {
    let rule = "title: One of\n\
                logsource:\n\
                \x20 product: windows\n\
                detection:\n\
                \x20 selection_enc:\n\
                \x20   CommandLine|contains: '-enc'\n\
                \x20 selection_ep:\n\
                \x20   CommandLine|contains: '-ep bypass'\n\
                \x20 condition: 1 of selection_*\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"source="WinEventLog:*" CommandLine="*-enc*" OR CommandLine="*-ep bypass*""#
    );
}

#[test]
fn parentheses_error_is_fatal() {
    let translation = converter().translate(
        "splunk-spl-query",
        "sentinel-kql-query",
        r#"(EventCode=1 AND (user="a")"#,
    );
    assert!(!translation.status);
    assert_eq!(
        translation.result,
        TranslateError::QueryParentheses.to_string()
    );
}

#[test]
fn unknown_target_platform_is_reported() {
    let translation = converter().translate("splunk-spl-query", "arcsight", "a=1");
    assert!(!translation.status);
    assert!(translation.result.contains("arcsight"));
}

#[test]
fn unmapped_fields_attach_diagnostics_but_succeed() {
    let translation = converter().translate(
        "splunk-spl-query",
        "sentinel-kql-query",
        "custom_field=1",
    );
    assert!(translation.status);
    assert!(!translation.diagnostics.is_empty());
    assert!(translation.result.contains("custom_field == 1"));
}

#[test]
fn strict_mode_turns_diagnostics_fatal() {
    let translation = converter().translate_strict(
        "splunk-spl-query",
        "sentinel-kql-query",
        "custom_field=1",
    );
    assert!(!translation.status);
    assert!(translation.result.contains("strict render failed"));
}

#[test]
fn sigma_to_elastic_rule_document() {
    let rule = "title: Encoded PowerShell\n\
                logsource:\n\
                \x20 product: windows\n\
                tags:\n\
                \x20 - attack.execution\n\
                \x20 - attack.t1059.003\n\
                level: high\n\
                detection:\n\
                \x20 selection:\n\
                \x20   CommandLine|contains: '-enc'\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "elastic-lucene-rule", rule);
    assert!(translation.status, "failed: {}", translation.result);
    let parsed: serde_json::Value = serde_json::from_str(&translation.result).unwrap();
    assert_eq!(parsed["name"], "Encoded PowerShell");
    assert_eq!(parsed["severity"], "high");
    assert!(parsed["query"]
        .as_str()
        .unwrap()
        .contains("process.command_line"));
    assert_eq!(parsed["threat"][0]["technique"][0]["id"], "T1059.003");
}

#[test]
fn sigma_to_chronicle_rule() {
    let rule = "title: Encoded PowerShell\n\
                logsource:\n\
                \x20 product: windows\n\
                detection:\n\
                \x20 selection:\n\
                \x20   CommandLine|contains: '-enc'\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "chronicle-yaral-rule", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert!(translation.result.starts_with("rule encoded_powershell {"));
    assert!(translation
        .result
        .contains("$e.target.process.command_line = /.*-enc.*/ nocase"));
}

#[test]
fn sentinel_rule_to_splunk_alert() {
    let rule = serde_json::json!({
        "displayName": "Encoded PowerShell",
        "description": "Detects encoded commands",
        "severity": "High",
        "query": "SecurityEvent | where EventID == 4688"
    });
    let translation = converter().translate(
        "sentinel-kql-rule",
        "splunk-spl-rule",
        &rule.to_string(),
    );
    assert!(translation.status, "failed: {}", translation.result);
    assert!(translation.result.starts_with("[Encoded PowerShell]\n"));
    assert!(translation
        .result
        .contains(r#"search = source="WinEventLog:Security" EventCode=4688"#));
}

#[test]
fn splunk_functions_translate_to_kql_pipes() {
    let translation = converter().translate(
        "splunk-spl-query",
        "sentinel-kql-query",
        "EventCode=4625 | stats count by user | sort -count",
    );
    assert!(translation.status, "failed: {}", translation.result);
    assert!(translation.result.contains("| summarize count()"));
    assert!(translation.result.contains("| sort by count desc"));
}

#[test]
fn keyword_only_query_translates() {
    let translation =
        converter().translate("elastic-lucene-query", "splunk-spl-query", "mimikatz");
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(translation.result, "\"mimikatz\"");
}

#[test]
fn platform_enumeration_exposes_descriptors() {
    let converter = converter();
    let renders = converter.renders();
    assert!(renders.iter().any(|d| d.siem_type == "splunk-spl-query"));
    let parsers = converter.parsers();
    assert!(parsers.iter().any(|d| d.siem_type == "sigma"));
}
