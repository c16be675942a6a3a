use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn graylog_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows",
                &[("product", &["windows"])],
                &[
                    ("EventID", "winlog_event_id"),
                    ("CommandLine", "winlog_command_line"),
                    ("Image", "winlog_process_image"),
                    ("ParentImage", "winlog_parent_process_image"),
                    ("User", "winlog_user_name"),
                    ("SourceIp", "source_ip"),
                    ("DestinationIp", "destination_ip"),
                    ("DestinationPort", "destination_port"),
                ],
                None,
            ),
            SourceMapping::new(
                "linux",
                &[("product", &["linux"])],
                &[
                    ("CommandLine", "command_line"),
                    ("Image", "process_path"),
                    ("User", "user_name"),
                ],
                None,
            ),
        ])
    })
}
