use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn athena_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![SourceMapping::new(
            "windows",
            &[("table", &["windows_events", "eventlog"])],
            &[
                ("EventID", "event_id"),
                ("CommandLine", "command_line"),
                ("Image", "process_path"),
                ("ParentImage", "parent_process_path"),
                ("User", "user_name"),
                ("SourceIp", "src_ip"),
                ("DestinationIp", "dst_ip"),
                ("DestinationPort", "dst_port"),
            ],
            Some("windows_events"),
        )])
    })
}
