use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn sentinel_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_security",
                &[("table", &["SecurityEvent"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "CommandLine"),
                    ("NewProcessName", "NewProcessName"),
                    ("User", "Account"),
                    ("LogonType", "LogonType"),
                    ("TargetUserName", "TargetAccount"),
                    ("SubjectUserName", "SubjectAccount"),
                ],
                Some("SecurityEvent"),
            ),
            SourceMapping::new(
                "windows_sysmon",
                &[("table", &["SysmonEvent"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "Image"),
                    ("ParentImage", "ParentImage"),
                    ("ParentCommandLine", "ParentCommandLine"),
                    ("User", "User"),
                    ("TargetFilename", "TargetFilename"),
                    ("TargetObject", "TargetObject"),
                    ("SourceIp", "SourceIp"),
                    ("DestinationIp", "DestinationIp"),
                    ("DestinationPort", "DestinationPort"),
                ],
                Some("SysmonEvent"),
            ),
            SourceMapping::new(
                "windows",
                &[("table", &["SecurityEvent", "Event"])],
                &[
                    ("EventID", "EventID"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "NewProcessName"),
                    ("User", "Account"),
                    ("ServiceName", "ServiceName"),
                ],
                Some("SecurityEvent"),
            ),
        ])
    })
}

pub fn defender_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_sysmon",
                &[("table", &["DeviceProcessEvents"])],
                &[
                    ("CommandLine", "ProcessCommandLine"),
                    ("Image", "FolderPath"),
                    ("ParentImage", "InitiatingProcessFolderPath"),
                    ("ParentCommandLine", "InitiatingProcessCommandLine"),
                    ("User", "AccountName"),
                    ("DestinationIp", "RemoteIP"),
                    ("DestinationPort", "RemotePort"),
                ],
                Some("DeviceProcessEvents"),
            ),
            SourceMapping::new(
                "windows",
                &[("table", &["DeviceProcessEvents", "DeviceEvents"])],
                &[
                    ("CommandLine", "ProcessCommandLine"),
                    ("Image", "FolderPath"),
                    ("ParentImage", "InitiatingProcessFolderPath"),
                    ("User", "AccountName"),
                ],
                Some("DeviceProcessEvents"),
            ),
        ])
    })
}
