use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn crowdstrike_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_sysmon",
                &[("sourcetype", &["ProcessRollup2"])],
                &[
                    ("CommandLine", "CommandLine"),
                    ("Image", "ImageFileName"),
                    ("ParentImage", "ParentBaseFileName"),
                    ("ParentCommandLine", "ParentCommandLine"),
                    ("User", "UserName"),
                    ("SourceIp", "LocalAddressIP4"),
                    ("DestinationIp", "RemoteAddressIP4"),
                    ("DestinationPort", "RemotePort"),
                    ("Hashes", "SHA256HashData"),
                ],
                Some("event_simpleName=ProcessRollup2"),
            ),
            SourceMapping::new(
                "windows",
                &[("sourcetype", &["ProcessRollup2", "SyntheticProcessRollup2"])],
                &[
                    ("CommandLine", "CommandLine"),
                    ("Image", "ImageFileName"),
                    ("ParentImage", "ParentBaseFileName"),
                    ("User", "UserName"),
                ],
                Some("event_simpleName=ProcessRollup2"),
            ),
        ])
    })
}
