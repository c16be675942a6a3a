use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn qradar_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_security",
                &[("table", &["events"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "Command"),
                    ("User", "username"),
                    ("LogonType", "Logon Type"),
                ],
                Some("events"),
            ),
            SourceMapping::new(
                "windows",
                &[("table", &["events"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "Command"),
                    ("Image", "Process Path"),
                    ("ParentImage", "Parent Process Path"),
                    ("User", "username"),
                    ("SourceIp", "sourceip"),
                    ("DestinationIp", "destinationip"),
                    ("DestinationPort", "destinationport"),
                ],
                Some("events"),
            ),
        ])
    })
}
