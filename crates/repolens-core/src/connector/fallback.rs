//! Connector used when the server type is not recognized.

use async_trait::async_trait;

use super::{Connector, FALLBACK_ID};
use crate::error::Result;
use crate::types::ResultEntry;

/// Returns no entries and performs no requests
#[derive(Debug, Default)]
pub struct FallbackConnector;

impl FallbackConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for FallbackConnector {
    fn id(&self) -> &'static str {
        FALLBACK_ID
    }

    async fn results(&self) -> Result<Vec<ResultEntry>> {
        Ok(Vec::new())
    }
}
