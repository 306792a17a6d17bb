//! Revision labels and the file names derived from them.

use std::fmt;

/// Display name of the stash sentinel.
pub const STASH_LABEL: &str = "stash";

/// File stem used for the stash sentinel. `@` is always percent-encoded in
/// named revisions, so no branch name can produce this stem.
const STASH_STEM: &str = "@stash";

/// A point in history to benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    /// A branch, tag or commit id, passed to git verbatim
    Named(String),
    /// The uncommitted working-tree changes, benchmarked via `git stash`
    Stash,
}

impl Revision {
    pub fn named(label: impl Into<String>) -> Self {
        Revision::Named(label.into())
    }

    fn file_stem(&self) -> String {
        match self {
            Revision::Named(name) => encode_component(name),
            Revision::Stash => STASH_STEM.to_string(),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Named(name) => f.write_str(name),
            Revision::Stash => f.write_str(STASH_LABEL),
        }
    }
}

/// Identity of one benchmark run: the revision plus an optional variant that
/// tells apart two runs of the same revision (e.g. with different toolchains).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunLabel {
    pub revision: Revision,
    pub variant: Option<String>,
}

impl RunLabel {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            variant: None,
        }
    }

    pub fn with_variant(revision: Revision, variant: impl Into<String>) -> Self {
        Self {
            revision,
            variant: Some(variant.into()),
        }
    }

    /// File name stem for this run's output files.
    ///
    /// Named revisions are percent-encoded so `feature/x` becomes
    /// `feature%2Fx`. The variant is appended after a literal `+`, which the
    /// encoding never emits, so distinct labels always map to distinct stems.
    pub fn file_stem(&self) -> String {
        let stem = self.revision.file_stem();
        match &self.variant {
            Some(variant) => format!("{}+{}", stem, encode_component(variant)),
            None => stem,
        }
    }

    pub fn bench_file_name(&self) -> String {
        format!("{}.bench", self.file_stem())
    }

    pub fn profile_file_name(&self) -> String {
        format!("{}.pprof", self.file_stem())
    }
}

impl fmt::Display for RunLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} ({})", self.revision, variant),
            None => write!(f, "{}", self.revision),
        }
    }
}

fn encode_component(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_plain_branch_stem_is_unchanged() {
        let label = RunLabel::new(Revision::named("main"));
        assert_eq!(label.bench_file_name(), "main.bench");
        assert_eq!(label.profile_file_name(), "main.pprof");
    }

    #[test]
    fn test_path_separators_replaced() {
        let label = RunLabel::new(Revision::named("feature/deep/branch"));
        assert_eq!(label.file_stem(), "feature%2Fdeep%2Fbranch");
        assert!(!label.bench_file_name().contains('/'));

        let windows = RunLabel::new(Revision::named("a\\b"));
        assert!(!windows.file_stem().contains('\\'));
    }

    #[test]
    fn test_stem_is_deterministic() {
        let a = RunLabel::new(Revision::named("release/1.2"));
        let b = RunLabel::new(Revision::named("release/1.2"));
        assert_eq!(a.file_stem(), b.file_stem());
    }

    #[test]
    fn test_stash_sentinel_does_not_collide_with_branch_named_stash() {
        let sentinel = RunLabel::new(Revision::Stash);
        let branch = RunLabel::new(Revision::named("stash"));
        let at_branch = RunLabel::new(Revision::named("@stash"));
        assert_eq!(sentinel.to_string(), "stash");
        assert_ne!(sentinel.file_stem(), branch.file_stem());
        assert_ne!(sentinel.file_stem(), at_branch.file_stem());
    }

    #[test]
    fn test_distinct_labels_never_collide() {
        let labels = vec![
            RunLabel::new(Revision::named("feature/x")),
            RunLabel::new(Revision::named("feature_x")),
            RunLabel::new(Revision::named("feature-x")),
            RunLabel::new(Revision::named("feature%2Fx")),
            RunLabel::new(Revision::named("feature+x")),
            RunLabel::new(Revision::named("feature")),
            RunLabel::with_variant(Revision::named("feature"), "x"),
            RunLabel::with_variant(Revision::named("feature"), "baseline"),
            RunLabel::with_variant(Revision::named("feature/x"), "go1.21"),
            RunLabel::new(Revision::named("v1.0.0")),
            RunLabel::new(Revision::named("a1b2c3d")),
            RunLabel::new(Revision::Stash),
            RunLabel::new(Revision::named("stash")),
            RunLabel::with_variant(Revision::Stash, "go1.21"),
        ];

        let stems: HashSet<String> = labels.iter().map(|l| l.file_stem()).collect();
        assert_eq!(stems.len(), labels.len(), "stems collided: {:?}", stems);
    }

    #[test]
    fn test_display_includes_variant() {
        let label = RunLabel::with_variant(Revision::named("main"), "go1.21");
        assert_eq!(label.to_string(), "main (go1.21)");
    }
}
