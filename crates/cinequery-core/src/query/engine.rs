//! Find pipeline: filter, sort, skip, limit, project

use super::filter::Filter;
use super::projection::Projection;
use super::sort::sort_documents;
use crate::error::ExecutionError;
use crate::store::FindOptions;
use serde_json::{Map, Value};

/// A filter and projection compiled ahead of a scan
#[derive(Debug, Clone)]
pub struct CompiledFind {
    filter: Filter,
    projection: Option<Projection>,
}

impl CompiledFind {
    /// Compile the filter and projection; nothing is read before this succeeds
    pub fn compile(
        filter: &Map<String, Value>,
        options: &FindOptions,
    ) -> Result<Self, ExecutionError> {
        let filter = Filter::compile(filter)?;
        let projection = options
            .projection
            .as_ref()
            .map(Projection::compile)
            .transpose()?;
        Ok(Self { filter, projection })
    }

    /// Test one document against the compiled filter
    pub fn matches(&self, doc: &Value) -> bool {
        self.filter.matches(doc)
    }

    /// Run the find over `docs`, which are visited in natural (insertion)
    /// order.
    ///
    /// Without a sort the scan stops as soon as `skip + limit` matches are
    /// collected.
    pub fn run<I>(&self, docs: I, options: &FindOptions) -> Result<Vec<Value>, ExecutionError>
    where
        I: IntoIterator<Item = Result<Value, ExecutionError>>,
    {
        let skip = options.skip.unwrap_or(0);
        let wanted = options.limit.map(|limit| skip.saturating_add(limit));

        let mut matched = Vec::new();
        for doc in docs {
            let doc = doc?;
            if !self.filter.matches(&doc) {
                continue;
            }
            matched.push(doc);
            if options.sort.is_empty() && wanted.is_some_and(|w| matched.len() >= w) {
                break;
            }
        }

        sort_documents(&mut matched, &options.sort);

        let window = matched
            .into_iter()
            .skip(skip)
            .take(options.limit.unwrap_or(usize::MAX));
        Ok(match &self.projection {
            Some(projection) => window.map(|doc| projection.apply(doc)).collect(),
            None => window.collect(),
        })
    }
}

/// Compile and run a find in one step
pub fn find<I>(
    docs: I,
    filter: &Map<String, Value>,
    options: &FindOptions,
) -> Result<Vec<Value>, ExecutionError>
where
    I: IntoIterator<Item = Result<Value, ExecutionError>>,
{
    CompiledFind::compile(filter, options)?.run(docs, options)
}
