//! Sigma rule corpus scenarios: realistic rules through the full pipeline.

use ruleshift_core::{Severity, SiemConverter};

fn converter() -> SiemConverter {
    SiemConverter::new()
}

const ENCODED_POWERSHELL: &str = "\
title: Encoded PowerShell Command Line
id: 3a2b4c5d-1111-2222-3333-444455556666
status: experimental
description: Detects PowerShell started with an encoded command
author: SOC Team
date: 2024-03-01
references:
  - https://attack.mitre.org/techniques/T1059/001/
tags:
  - attack.execution
  - attack.t1059.001
logsource:
  product: windows
detection:
  selection:
    CommandLine|contains|all:
      - '-enc'
      - 'powershell'
  filter:
    User: 'NT AUTHORITY\\SYSTEM'
  condition: selection and not filter
falsepositives:
  - Administrative scripts
level: high
";

#[test]
fn full_rule_to_splunk() {
    let translation = converter().translate("sigma", "splunk-spl-query", ENCODED_POWERSHELL);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"source="WinEventLog:*" (CommandLine="*-enc*" CommandLine="*powershell*") NOT User="NT AUTHORITY\\SYSTEM""#
    );
}

#[test]
fn full_rule_to_sentinel_rule_keeps_meta() {
    let translation = converter().translate("sigma", "sentinel-kql-rule", ENCODED_POWERSHELL);
    assert!(translation.status, "failed: {}", translation.result);
    let parsed: serde_json::Value = serde_json::from_str(&translation.result).unwrap();
    assert_eq!(parsed["displayName"], "Encoded PowerShell Command Line");
    assert_eq!(parsed["severity"], "High");
    assert_eq!(parsed["tactics"][0], "Execution");
    assert_eq!(parsed["techniques"][0], "T1059.001");
    let description = parsed["description"].as_str().unwrap();
    assert!(description.contains("Author: SOC Team."));
    assert!(description.contains("Rule ID: 3a2b4c5d-1111-2222-3333-444455556666."));
}

#[test]
fn numeric_list_renders_with_in_where_available() {
    let rule = "title: Logon events\n\
                logsource:\n\
                \x20 product: windows\n\
                \x20 service: security\n\
                detection:\n\
                \x20 selection:\n\
                \x20   EventID:\n\
                \x20     - 4624\n\
                \x20     - 4625\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(translation.status, "failed: {}", translation.result);
    assert_eq!(
        translation.result,
        r#"source="WinEventLog:Security" (EventCode=4624 OR EventCode=4625)"#
    );
}

#[test]
fn modifier_chain_too_long_is_fatal() {
    let rule = "title: Bad modifiers\n\
                logsource:\n\
                \x20 product: windows\n\
                detection:\n\
                \x20 selection:\n\
                \x20   CommandLine|contains|all|windash: ['-enc']\n\
                \x20 condition: selection\n";
    let translation = converter().translate("sigma", "splunk-spl-query", rule);
    assert!(!translation.status);
    assert!(translation.result.contains("modifier chain too long"));
}

#[test]
fn rule_defaults_apply_when_meta_is_sparse() {
    let rule = "detection:\n\
                \x20 selection:\n\
                \x20   EventID: 1\n\
                \x20 condition: selection\n";
    let container = {
        use ruleshift_core::parser::QueryParser;
        ruleshift_core::platforms::sigma::SigmaParser::new()
            .parse(rule)
            .unwrap()
    };
    let meta = &container.meta_info;
    assert_eq!(meta.severity, Severity::Low);
    assert_eq!(meta.license, "DRL 1.1");
    assert_eq!(meta.status, "stable");
    assert_eq!(meta.id.len(), 36);
    assert!(!meta.date.is_empty());
}

#[test]
fn sigma_round_trip_preserves_semantics() {
    // sigma -> splunk -> sigma: the reconstructed rule must carry the same
    // comparisons even though selection names differ
    let to_splunk = converter().translate("sigma", "splunk-spl-query", ENCODED_POWERSHELL);
    assert!(to_splunk.status);
    let back = converter().translate("splunk-spl-query", "sigma", &to_splunk.result);
    assert!(back.status, "failed: {}", back.result);
    assert!(back.result.contains("CommandLine|contains:"));
    assert!(back.result.contains("-enc"));
    assert!(back.result.contains("powershell"));
}
