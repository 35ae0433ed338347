//! Region/bucket whitelist check

use crate::{GatewayError, RegionRegistry, Result};
use std::sync::Arc;

/// A region/bucket pair that passed [`RequestValidator::validate`]
///
/// Only the validator constructs these, so holding one proves the pair is
/// whitelisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValidatedTarget {
    region: String,
    bucket: String,
}

impl ValidatedTarget {
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl std::fmt::Display for ValidatedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.region, self.bucket)
    }
}

/// Gatekeeper run before any backend client is built
#[derive(Clone, Debug)]
pub struct RequestValidator {
    registry: Arc<RegionRegistry>,
}

impl RequestValidator {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        Self { registry }
    }

    /// Check the region, then the bucket within it
    pub fn validate(&self, region: &str, bucket: &str) -> Result<ValidatedTarget> {
        if self.registry.resolve_region(region).is_none() {
            return Err(GatewayError::UnknownRegion(region.to_string()));
        }
        if !self.registry.is_permitted(region, bucket) {
            return Err(GatewayError::BucketNotAllowed {
                region: region.to_string(),
                bucket: bucket.to_string(),
            });
        }
        Ok(ValidatedTarget {
            region: region.to_string(),
            bucket: bucket.to_string(),
        })
    }
}
