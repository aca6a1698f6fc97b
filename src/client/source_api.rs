// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use tracing::debug;

use super::CatalogClient;
use crate::backend::{CatalogError, SourceInfo};
use crate::metrics::{self, LatencyTimer};

impl CatalogClient {
    /// Federated sources, with the local catalog flagged.
    pub async fn sources(&self) -> Result<Vec<SourceInfo>, CatalogError> {
        let _timer = LatencyTimer::new("sources");

        let ids = self
            .backend
            .source_ids()
            .await
            .inspect_err(|e| Self::record_failure("sources", e))?;
        let (info, local) = tokio::join!(self.backend.source_info(&ids), self.metadata.local_catalog_id());
        let (mut info, local) = match (info, local) {
            (Ok(info), Ok(local)) => (info, local),
            (Err(e), _) | (_, Err(e)) => {
                Self::record_failure("sources", &e);
                return Err(e);
            }
        };

        for source in &mut info {
            source.local = source.id == local;
        }
        metrics::record_query("sources", "success");
        debug!(sources = info.len(), local = %local, "Listed sources");
        Ok(info)
    }
}
