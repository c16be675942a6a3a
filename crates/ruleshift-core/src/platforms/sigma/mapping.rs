//! Sigma source mappings. Sigma field names are the generic schema, so the
//! field tables are identities over the fields each log source carries.

use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

const PROCESS_FIELDS: &[(&str, &str)] = &[
    ("EventID", "EventID"),
    ("CommandLine", "CommandLine"),
    ("Image", "Image"),
    ("ParentImage", "ParentImage"),
    ("ParentCommandLine", "ParentCommandLine"),
    ("OriginalFileName", "OriginalFileName"),
    ("ProcessName", "ProcessName"),
    ("NewProcessName", "NewProcessName"),
    ("User", "User"),
    ("LogonType", "LogonType"),
    ("TargetUserName", "TargetUserName"),
    ("SubjectUserName", "SubjectUserName"),
    ("TargetFilename", "TargetFilename"),
    ("TargetObject", "TargetObject"),
    ("Details", "Details"),
    ("ServiceName", "ServiceName"),
    ("ServiceFileName", "ServiceFileName"),
    ("Hashes", "Hashes"),
    ("SourceIp", "SourceIp"),
    ("SourcePort", "SourcePort"),
    ("DestinationIp", "DestinationIp"),
    ("DestinationPort", "DestinationPort"),
    ("DestinationHostname", "DestinationHostname"),
];

pub fn sigma_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_security",
                &[("product", &["windows"]), ("service", &["security"])],
                PROCESS_FIELDS,
                None,
            ),
            SourceMapping::new(
                "windows_sysmon",
                &[("product", &["windows"]), ("service", &["sysmon"])],
                PROCESS_FIELDS,
                None,
            ),
            SourceMapping::new(
                "windows_powershell",
                &[("product", &["windows"]), ("service", &["powershell"])],
                PROCESS_FIELDS,
                None,
            ),
            SourceMapping::new("windows", &[("product", &["windows"])], PROCESS_FIELDS, None),
            SourceMapping::new("linux", &[("product", &["linux"])], PROCESS_FIELDS, None),
        ])
    })
}
