use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

/// ECS bindings shared across the Lucene platforms.
pub(crate) const ECS_PROCESS_FIELDS: &[(&str, &str)] = &[
    ("EventID", "event.code"),
    ("CommandLine", "process.command_line"),
    ("Image", "process.executable"),
    ("ParentImage", "process.parent.executable"),
    ("ParentCommandLine", "process.parent.command_line"),
    ("OriginalFileName", "process.pe.original_file_name"),
    ("User", "user.name"),
    ("TargetFilename", "file.path"),
    ("SourceIp", "source.ip"),
    ("SourcePort", "source.port"),
    ("DestinationIp", "destination.ip"),
    ("DestinationPort", "destination.port"),
    ("DestinationHostname", "destination.domain"),
    ("Hashes", "process.hash.sha256"),
];

pub(crate) fn ecs_source_mappings() -> Vec<SourceMapping> {
    vec![
        SourceMapping::new(
            "windows_security",
            &[("product", &["windows"]), ("service", &["security"])],
            ECS_PROCESS_FIELDS,
            None,
        ),
        SourceMapping::new(
            "windows_sysmon",
            &[("product", &["windows"]), ("service", &["sysmon"])],
            ECS_PROCESS_FIELDS,
            None,
        ),
        SourceMapping::new("windows", &[("product", &["windows"])], ECS_PROCESS_FIELDS, None),
        SourceMapping::new("linux", &[("product", &["linux"])], ECS_PROCESS_FIELDS, None),
    ]
}

pub fn elasticsearch_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| PlatformMappings::new(ecs_source_mappings()))
}
