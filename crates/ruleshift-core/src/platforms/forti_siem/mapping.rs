use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn forti_siem_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![SourceMapping::new(
            "windows",
            &[("product", &["windows"])],
            &[
                ("EventID", "winEventId"),
                ("CommandLine", "command"),
                ("Image", "procName"),
                ("ParentImage", "parentProcName"),
                ("User", "user"),
                ("SourceIp", "srcIpAddr"),
                ("DestinationIp", "destIpAddr"),
                ("DestinationPort", "destIpPort"),
            ],
            None,
        )])
    })
}
