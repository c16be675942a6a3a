use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn logscale_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_sysmon",
                &[("product", &["windows"]), ("service", &["sysmon"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "Image"),
                    ("ParentImage", "ParentImage"),
                    ("User", "User"),
                    ("TargetFilename", "TargetFilename"),
                    ("DestinationIp", "DestinationIp"),
                    ("DestinationPort", "DestinationPort"),
                ],
                None,
            ),
            SourceMapping::new(
                "windows",
                &[("product", &["windows"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "Image"),
                    ("User", "User"),
                ],
                None,
            ),
        ])
    })
}
