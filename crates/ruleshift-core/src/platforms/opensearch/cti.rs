//! OpenSearch CTI hunting-query renderer.

use super::consts::opensearch_query_details;
use crate::cti::{CtiMapping, RenderCti};
use crate::managers::PlatformDetails;
use crate::platforms::elasticsearch::cti::ecs_cti_mapping;

pub struct OpenSearchCti {
    details: PlatformDetails,
}

impl Default for OpenSearchCti {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSearchCti {
    pub fn new() -> Self {
        Self {
            details: opensearch_query_details(),
        }
    }
}

impl RenderCti for OpenSearchCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        ecs_cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}:\"{value}\"")
    }
}
