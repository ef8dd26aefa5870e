//! Built-in configuration values.
//!
//! The pinned table below is the only set of ecosystem versions analysis is
//! guaranteed to be correct for. It is process-wide, read-only data: it is
//! copied into the configuration at load time and never mutated afterwards.

use apidoc_core::PinnedDependency;

pub const CONFIG_VERSION: &str = "1.0";

pub const DEFAULT_REPOSITORIES: &[&str] = &[
    "https://repo1.maven.org/maven2/",
    "https://repo.clojars.org/",
];

/// Host environment keys the sandboxed process may see.
pub const DEFAULT_PASS_ENV: &[&str] = &["PATH", "JAVA_HOME"];

pub const DEFAULT_ANALYZER_PROGRAM: &str = "java";

pub const DEFAULT_ANALYZER_ARGS: &[&str] = &["clojure.main", "-m", "apidoc.extract"];

/// Pinned entry whose jar provides the analyzer entry namespace.
pub const DEFAULT_ANALYZER_ARTIFACT: &str = "apidoc/apidoc-extract";

pub const DEFAULT_ANALYZER_VERSION: &str = "0.1.0";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// The complete class path analysis runs against.
///
/// Resolution is flat, so every jar the language runtimes and the extractor
/// load must be listed here. ClojureScript's compiler is pinned as the
/// self-contained `closure-compiler` jar, which bundles its own
/// dependencies.
pub fn pinned_dependencies() -> Vec<PinnedDependency> {
    vec![
        // Clojure
        PinnedDependency::new("org.clojure/clojure", "1.11.1"),
        PinnedDependency::new("org.clojure/spec.alpha", "0.3.218"),
        PinnedDependency::new("org.clojure/core.specs.alpha", "0.2.62"),
        // ClojureScript and its runtime dependencies
        PinnedDependency::new("org.clojure/clojurescript", "1.11.60"),
        PinnedDependency::new("com.google.javascript/closure-compiler", "v20220502"),
        PinnedDependency::new("org.clojure/google-closure-library", "0.0-20211011-0726fdeb"),
        PinnedDependency::new(
            "org.clojure/google-closure-library-third-party",
            "0.0-20211011-0726fdeb",
        ),
        PinnedDependency::new("org.clojure/data.json", "2.4.0"),
        PinnedDependency::new("com.cognitect/transit-java", "1.0.362"),
        PinnedDependency::new("com.fasterxml.jackson.core/jackson-core", "2.14.2"),
        PinnedDependency::new("org.msgpack/msgpack", "0.6.12"),
        PinnedDependency::new("com.googlecode.json-simple/json-simple", "1.1.1"),
        PinnedDependency::new("org.javassist/javassist", "3.18.1-GA"),
        // Source loading
        PinnedDependency::new("org.clojure/tools.namespace", "1.4.4"),
        PinnedDependency::new("org.clojure/tools.reader", "1.3.6"),
        PinnedDependency::new("org.clojure/java.classpath", "1.0.0"),
        // Extraction routine
        PinnedDependency::new(DEFAULT_ANALYZER_ARTIFACT, DEFAULT_ANALYZER_VERSION),
    ]
}

pub fn repositories() -> Vec<String> {
    DEFAULT_REPOSITORIES.iter().map(|s| s.to_string()).collect()
}

pub fn pass_env() -> Vec<String> {
    DEFAULT_PASS_ENV.iter().map(|s| s.to_string()).collect()
}

pub fn analyzer_args() -> Vec<String> {
    DEFAULT_ANALYZER_ARGS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_table_is_valid_and_unique() {
        let pinned = pinned_dependencies();
        for dep in &pinned {
            dep.validate().unwrap();
        }
        let mut names: Vec<_> = pinned.iter().map(|d| d.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), pinned.len());
    }

    #[test]
    fn test_pinned_table_is_flat() {
        let pinned = pinned_dependencies();
        // Exclusions only matter to transitive resolution, which never runs.
        assert!(pinned.iter().all(|d| d.exclusions.is_empty()));
        assert!(pinned.iter().any(|d| d.name == DEFAULT_ANALYZER_ARTIFACT));
        assert!(pinned
            .iter()
            .any(|d| d.name == "com.google.javascript/closure-compiler"));
    }
}
