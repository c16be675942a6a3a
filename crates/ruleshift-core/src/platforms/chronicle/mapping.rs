use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn chronicle_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_sysmon",
                &[("product", &["windows"])],
                &[
                    ("EventID", "metadata.product_event_type"),
                    ("CommandLine", "target.process.command_line"),
                    ("Image", "target.process.file.full_path"),
                    ("ParentImage", "principal.process.file.full_path"),
                    ("ParentCommandLine", "principal.process.command_line"),
                    ("User", "principal.user.userid"),
                    ("SourceIp", "principal.ip"),
                    ("DestinationIp", "target.ip"),
                    ("DestinationPort", "target.port"),
                    ("Hashes", "target.process.file.sha256"),
                ],
                None,
            ),
            SourceMapping::new(
                "windows",
                &[("product", &["windows"])],
                &[
                    ("EventID", "metadata.product_event_type"),
                    ("CommandLine", "target.process.command_line"),
                    ("Image", "target.process.file.full_path"),
                    ("ParentImage", "principal.process.file.full_path"),
                    ("User", "principal.user.userid"),
                ],
                None,
            ),
        ])
    })
}
