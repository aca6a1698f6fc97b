// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query API for CatalogClient
//!
//! ```text
//! query(filter, settings)
//!       │
//!       ├─→ default page size applied if count unset
//!       ├─→ QueryAssembler (compile tree → CQL, validate settings)
//!       ├─→ backend.query(BackendQuery)
//!       └─→ ResultShaper against the current schema snapshot
//! ```

use tracing::{debug, warn};

use super::CatalogClient;
use crate::backend::CatalogError;
use crate::filter::PredicateNode;
use crate::metrics::{self, LatencyTimer};
use crate::query::{
    FacetBucket, QueryAssembler, QueryFilter, QueryResult, QuerySettings, RelatedQuery,
    ResultRecord, ResultShaper,
};
use crate::schema::{ID, METACARD_TAGS};

impl CatalogClient {
    /// Run a query.
    ///
    /// `filter` is a [`PredicateNode`] or a raw CQL [`QueryFilter::Cql`].
    pub async fn query(
        &self,
        filter: impl Into<QueryFilter>,
        settings: &QuerySettings,
    ) -> Result<QueryResult, CatalogError> {
        self.run("query", filter.into(), settings.clone()).await
    }

    /// Look a record up by id: `id = <id> AND metacard-tags LIKE '%'`
    pub async fn metacard_by_id(
        &self,
        id: &str,
        settings: &QuerySettings,
    ) -> Result<QueryResult, CatalogError> {
        let filter = PredicateNode::eq(ID, id).and(PredicateNode::any_tag());
        self.run("metacard_by_id", filter.into(), settings.clone()).await
    }

    /// Records carrying `tag`
    pub async fn metacards_by_tag(
        &self,
        tag: &str,
        settings: &QuerySettings,
    ) -> Result<QueryResult, CatalogError> {
        let filter = PredicateNode::eq(METACARD_TAGS, tag);
        self.run("metacards_by_tag", filter.into(), settings.clone()).await
    }

    /// Value counts for one attribute across the whole catalog.
    ///
    /// Returns no buckets when the backend reports none for `attribute`.
    pub async fn facet(&self, attribute: &str) -> Result<Vec<FacetBucket>, CatalogError> {
        let settings = QuerySettings::new().with_page_size(0).with_facet(attribute);
        let result = self
            .run("facet", PredicateNode::match_all().into(), settings)
            .await?;
        Ok(result.facet(attribute).map(<[FacetBucket]>::to_vec).unwrap_or_default())
    }

    /// Fetch the records a record refers to.
    ///
    /// An empty reference list returns immediately without querying.
    pub async fn related(&self, related: &RelatedQuery) -> Result<Vec<ResultRecord>, CatalogError> {
        let Some(filter) = related.predicate() else {
            return Ok(Vec::new());
        };
        let settings = QuerySettings::new().with_page_size(related.ids().len() as i64);
        let result = self.run("related", filter.into(), settings).await?;
        Ok(result.records)
    }

    async fn run(
        &self,
        operation: &'static str,
        filter: QueryFilter,
        mut settings: QuerySettings,
    ) -> Result<QueryResult, CatalogError> {
        let _timer = LatencyTimer::new(operation);
        if settings.page_size.is_none() {
            settings.page_size = self.config.default_page_size;
        }

        let assembled = QueryAssembler::assemble(&filter, &settings);
        if matches!(filter, QueryFilter::Tree(_)) {
            metrics::record_compile(assembled.is_ok());
        }
        let query = assembled.inspect_err(|e| Self::record_failure(operation, e))?;
        debug!(operation, cql = %query.cql, "Sending catalog query");

        let snapshot = self.registry.current();
        let result = match self.backend.query(&query).await {
            Ok(raw) => ResultShaper::shape(raw, snapshot.descriptor.identifiers()),
            Err(e) => Err(e),
        };

        match &result {
            Ok(shaped) => {
                metrics::record_query(operation, "success");
                metrics::record_query_hits(shaped.status.hits);
                debug!(
                    operation,
                    hits = shaped.status.hits,
                    count = shaped.status.count,
                    schema_version = snapshot.version,
                    "Catalog query complete"
                );
            }
            Err(e) => {
                warn!(operation, error = %e, "Catalog query failed");
                Self::record_failure(operation, e);
            }
        }
        result
    }

    pub(super) fn record_failure(operation: &str, error: &CatalogError) {
        metrics::record_query(operation, "error");
        metrics::record_error(operation, error.kind());
    }
}
