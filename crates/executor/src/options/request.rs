//! Per-request option keys.

use syncbase_core::{Error, Result};
use syncbase_engine::request::*;

use super::{CodedOption, OptionBag};

/// Populate a request from an option bag, stopping at the first invalid key.
pub trait ApplyOptions {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()>;
}

impl CodedOption for ScanConsistency {
    const NAME: &'static str = "scan consistency";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ScanConsistency::NotBounded),
            2 => Some(ScanConsistency::RequestPlus),
            _ => None,
        }
    }
}

impl CodedOption for QueryProfile {
    const NAME: &'static str = "profile";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(QueryProfile::Off),
            2 => Some(QueryProfile::Phases),
            3 => Some(QueryProfile::Timings),
            _ => None,
        }
    }
}

impl CodedOption for HighlightStyle {
    const NAME: &'static str = "highlight style";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(HighlightStyle::Ansi),
            2 => Some(HighlightStyle::Html),
            _ => None,
        }
    }
}

impl CodedOption for ViewScanConsistency {
    const NAME: &'static str = "scan consistency";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ViewScanConsistency::NotBounded),
            2 => Some(ViewScanConsistency::RequestPlus),
            3 => Some(ViewScanConsistency::UpdateAfter),
            _ => None,
        }
    }
}

/// Namespace argument of a view query: 1 is development, 2 is production.
pub fn design_document_namespace(code: i64) -> Result<DesignDocumentNamespace> {
    match code {
        1 => Ok(DesignDocumentNamespace::Development),
        2 => Ok(DesignDocumentNamespace::Production),
        _ => Err(Error::invalid_argument(
            "nameSpace",
            format!("invalid value used for namespace: {}", code),
        )),
    }
}

impl ApplyOptions for UpsertRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        if let Some(durability) = options.durability()? {
            self.durability = durability;
        }
        options.assign("preserveExpiry", &mut self.preserve_expiry)?;
        options.assign("expiry", &mut self.expiry)?;
        Ok(())
    }
}

impl ApplyOptions for GetRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        Ok(())
    }
}

impl ApplyOptions for GetProjectedRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        options.assign("withExpiry", &mut self.with_expiry)?;
        options.assign("projections", &mut self.projections)?;
        Ok(())
    }
}

impl ApplyOptions for ExistsRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        Ok(())
    }
}

impl ApplyOptions for QueryRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        if let Some(durability) = options.durability()? {
            self.durability = durability;
        }
        if let Some(consistency) = options.coded("scanConsistency")? {
            self.scan_consistency = Some(consistency);
        }
        options.assign_some("scanCap", &mut self.scan_cap)?;
        options.assign_some("pipelineCap", &mut self.pipeline_cap)?;
        options.assign_some("pipelineBatch", &mut self.pipeline_batch)?;
        options.assign_some("maxParallelism", &mut self.max_parallelism)?;
        if let Some(profile) = options.coded("profile")? {
            self.profile = Some(profile);
        }
        options.assign("readonly", &mut self.readonly)?;
        options.assign("flexIndex", &mut self.flex_index)?;
        options.assign("adHoc", &mut self.adhoc)?;
        options.assign("positionalParameters", &mut self.positional_parameters)?;
        options.assign("namedParameters", &mut self.named_parameters)?;
        options.assign("raw", &mut self.raw)?;
        if let Some(tokens) = options.mutation_state()? {
            self.mutation_state = tokens;
        }
        options.assign_some("clientContextId", &mut self.client_context_id)?;
        options.assign("metrics", &mut self.metrics)?;
        options.assign("preserveExpiry", &mut self.preserve_expiry)?;
        options.assign_some("scopeName", &mut self.scope_name)?;
        options.assign_some("bucketName", &mut self.bucket_name)?;
        Ok(())
    }
}

impl ApplyOptions for AnalyticsRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        if let Some(consistency) = options.coded("scanConsistency")? {
            self.scan_consistency = Some(consistency);
        }
        options.assign("readonly", &mut self.readonly)?;
        options.assign("priority", &mut self.priority)?;
        options.assign("positionalParameters", &mut self.positional_parameters)?;
        options.assign("namedParameters", &mut self.named_parameters)?;
        options.assign("raw", &mut self.raw)?;
        options.assign_some("clientContextId", &mut self.client_context_id)?;
        options.assign_some("scopeName", &mut self.scope_name)?;
        options.assign_some("bucketName", &mut self.bucket_name)?;
        Ok(())
    }
}

impl ApplyOptions for SearchRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        options.assign_some("limit", &mut self.limit)?;
        options.assign_some("skip", &mut self.skip)?;
        options.assign("explain", &mut self.explain)?;
        options.assign("disableScoring", &mut self.disable_scoring)?;
        options.assign("includeLocations", &mut self.include_locations)?;
        options.assign("highlightFields", &mut self.highlight_fields)?;
        if let Some(style) = options.coded("highlightStyle")? {
            self.highlight_style = Some(style);
        }
        options.assign("fields", &mut self.fields)?;
        options.assign("collections", &mut self.collections)?;
        options.assign("sortSpecs", &mut self.sort_specs)?;
        if let Some(tokens) = options.mutation_state()? {
            self.mutation_state = tokens;
        }
        options.assign("raw", &mut self.raw)?;
        options.assign("facets", &mut self.facets)?;
        options.assign_some("clientContextId", &mut self.client_context_id)?;
        Ok(())
    }
}

impl ApplyOptions for ViewRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        if let Some(consistency) = options.coded("scanConsistency")? {
            self.consistency = Some(consistency);
        }
        options.assign("keys", &mut self.keys)?;
        if let Some(order) = options.get::<i64>("order")? {
            self.order = Some(match order {
                0 => ViewSortOrder::Ascending,
                1 => ViewSortOrder::Descending,
                _ => {
                    return Err(Error::invalid_argument(
                        "order",
                        format!("invalid value used for order: {}", order),
                    ))
                }
            });
        }
        options.assign_some("reduce", &mut self.reduce)?;
        options.assign_some("group", &mut self.group)?;
        options.assign_some("groupLevel", &mut self.group_level)?;
        options.assign_some("limit", &mut self.limit)?;
        options.assign_some("skip", &mut self.skip)?;
        options.assign_some("key", &mut self.key)?;
        options.assign_some("startKey", &mut self.start_key)?;
        options.assign_some("endKey", &mut self.end_key)?;
        options.assign_some("startKeyDocId", &mut self.start_key_doc_id)?;
        options.assign_some("endKeyDocId", &mut self.end_key_doc_id)?;
        options.assign_some("inclusiveEnd", &mut self.inclusive_end)?;
        options.assign("debug", &mut self.debug)?;
        Ok(())
    }
}

/// The index definition mapping of a search-index upsert.
impl ApplyOptions for SearchIndex {
    fn apply_options(&mut self, index: &OptionBag<'_>) -> Result<()> {
        index.assign("name", &mut self.name)?;
        index.assign("type", &mut self.type_name)?;
        index.assign("uuid", &mut self.uuid)?;
        index.assign("params", &mut self.params)?;
        index.assign("sourceUuid", &mut self.source_uuid)?;
        index.assign("sourceName", &mut self.source_name)?;
        index.assign("sourceType", &mut self.source_type)?;
        index.assign("sourceParams", &mut self.source_params)?;
        Ok(())
    }
}

impl ApplyOptions for SearchIndexUpsertRequest {
    fn apply_options(&mut self, options: &OptionBag<'_>) -> Result<()> {
        if let Some(timeout) = options.timeout()? {
            self.timeout = Some(timeout);
        }
        Ok(())
    }
}
