use std::sync::OnceLock;

use crate::mapping::PlatformMappings;
use crate::platforms::elasticsearch::mapping::ecs_source_mappings;

pub fn opensearch_mappings() -> &'static PlatformMappings {
    static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
    MAPPINGS.get_or_init(|| PlatformMappings::new(ecs_source_mappings()))
}
