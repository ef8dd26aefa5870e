//! Per-platform analysis dispatch.

use apidoc_core::{NamespaceFilter, Platform, PlatformDocTree, PlatformSet, Result};
use apidoc_sandbox::{AnalysisRequest, PlatformAnalyzer, SandboxEnvironment};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Analyze every platform in `platforms`, at most `concurrency` at a time.
///
/// The first failure aborts the whole dispatch; in-flight analyses are
/// dropped and no partial mapping is returned.
pub async fn dispatch(
    analyzer: &dyn PlatformAnalyzer,
    sandbox: &SandboxEnvironment,
    platforms: &PlatformSet,
    source_dir: &Path,
    namespaces: Option<&NamespaceFilter>,
    concurrency: usize,
) -> Result<BTreeMap<Platform, PlatformDocTree>> {
    let requests: Vec<AnalysisRequest> = platforms
        .iter()
        .map(|platform| {
            AnalysisRequest::new(platform, source_dir).with_namespaces(namespaces.cloned())
        })
        .collect();
    debug!(platforms = requests.len(), concurrency, "Dispatching analyses");

    stream::iter(requests)
        .map(move |request| async move {
            let tree = analyzer.analyze(sandbox, &request).await?;
            Ok::<_, apidoc_core::Error>((request.platform, tree))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}
