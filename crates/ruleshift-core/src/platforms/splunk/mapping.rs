use std::sync::OnceLock;

use crate::mapping::{PlatformMappings, SourceMapping};

pub fn splunk_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_security",
                &[("source", &["WinEventLog:Security"])],
                &[
                    ("EventID", "EventCode"),
                    ("CommandLine", "Process_Command_Line"),
                    ("NewProcessName", "New_Process_Name"),
                    ("User", "user"),
                    ("LogonType", "Logon_Type"),
                    ("TargetUserName", "Target_User_Name"),
                    ("SubjectUserName", "Subject_User_Name"),
                ],
                Some(r#"source="WinEventLog:Security""#),
            ),
            SourceMapping::new(
                "windows_sysmon",
                &[("source", &["WinEventLog:Microsoft-Windows-Sysmon/Operational"])],
                &[
                    ("EventID", "EventCode"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "Image"),
                    ("ParentImage", "ParentImage"),
                    ("ParentCommandLine", "ParentCommandLine"),
                    ("OriginalFileName", "OriginalFileName"),
                    ("User", "User"),
                    ("TargetFilename", "TargetFilename"),
                    ("TargetObject", "TargetObject"),
                    ("Details", "Details"),
                    ("Hashes", "Hashes"),
                    ("SourceIp", "src_ip"),
                    ("SourcePort", "src_port"),
                    ("DestinationIp", "dest_ip"),
                    ("DestinationPort", "dest_port"),
                    ("DestinationHostname", "dest_host"),
                ],
                Some(r#"source="WinEventLog:Microsoft-Windows-Sysmon/Operational""#),
            ),
            SourceMapping::new(
                "windows",
                &[("source", &["WinEventLog:*"])],
                &[
                    ("EventID", "EventCode"),
                    ("CommandLine", "CommandLine"),
                    ("Image", "Image"),
                    ("ParentImage", "ParentImage"),
                    ("ParentCommandLine", "ParentCommandLine"),
                    ("User", "User"),
                    ("ProcessName", "process_name"),
                    ("ServiceName", "service_name"),
                    ("ServiceFileName", "service_file_name"),
                ],
                Some(r#"source="WinEventLog:*""#),
            ),
            SourceMapping::new(
                "linux",
                &[("sourcetype", &["linux:audit", "syslog"])],
                &[
                    ("CommandLine", "command"),
                    ("Image", "exe"),
                    ("User", "user"),
                ],
                Some(r#"sourcetype="linux:audit""#),
            ),
        ])
    })
}
