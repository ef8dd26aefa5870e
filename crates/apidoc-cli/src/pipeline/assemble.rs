//! Result assembly and validation.

use apidoc_core::{
    AnalysisResult, ArtifactRef, Error, Platform, PlatformDocTree, PlatformSet, Result,
    SchemaValidator,
};
use std::collections::BTreeMap;

/// Combine identity, per-platform trees and the verbatim metadata text.
///
/// Every tree must belong to a platform in `resolved`.
pub fn assemble(
    artifact: &ArtifactRef,
    resolved: &PlatformSet,
    codox: BTreeMap<Platform, PlatformDocTree>,
    pom_str: String,
) -> Result<AnalysisResult> {
    let stray: Vec<String> = codox
        .keys()
        .filter(|platform| !resolved.contains(**platform))
        .map(|platform| format!("codox key {} was not requested", platform))
        .collect();
    if !stray.is_empty() {
        return Err(Error::Validation { errors: stray });
    }

    Ok(AnalysisResult {
        group_id: artifact.project.group_id.clone(),
        artifact_id: artifact.project.artifact_id.clone(),
        version: artifact.version.clone(),
        codox,
        pom_str,
    })
}

/// Assemble and validate in one step; nothing invalid leaves this function.
pub fn assemble_validated(
    validator: &SchemaValidator,
    artifact: &ArtifactRef,
    resolved: &PlatformSet,
    codox: BTreeMap<Platform, PlatformDocTree>,
    pom_str: String,
) -> Result<AnalysisResult> {
    let result = assemble(artifact, resolved, codox, pom_str)?;
    validator.validate(&result)?;
    Ok(result)
}
