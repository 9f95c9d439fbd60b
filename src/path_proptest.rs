//! Property-based tests for path reference parsing and repository path joining.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{glob_match, join_repository_path, PathReference};
    use proptest::prelude::*;

    // ============================================================================
    // PathReference property tests
    // ============================================================================

    proptest! {
        /// Property: strings without a leading '@' are always local references
        #[test]
        fn plain_strings_are_local(input in "[a-zA-Z0-9_./:-]+") {
            prop_assume!(!input.starts_with('@'));
            prop_assert_eq!(
                PathReference::parse(&input),
                PathReference::Local { path: input.as_str() }
            );
        }

        /// Property: '@name:path' round-trips its package name and path
        #[test]
        fn package_reference_splits_name_and_path(
            name in "[a-z0-9_-]+(/[a-z0-9_-]+)?",
            path in "[a-zA-Z0-9_./-]+",
        ) {
            let raw = format!("@{}:{}", name, path);
            let reference = PathReference::parse(&raw);
            prop_assert_eq!(reference.package(), Some(name.as_str()));
            prop_assert_eq!(reference.relative_path(), path.as_str());
        }

        /// Property: a local reference's relative path is the input verbatim
        #[test]
        fn local_relative_path_is_verbatim(input in "[a-zA-Z0-9_./-]+") {
            prop_assert_eq!(PathReference::parse(&input).relative_path(), input.as_str());
        }
    }

    // ============================================================================
    // join_repository_path property tests
    // ============================================================================

    proptest! {
        /// Property: joining with an empty subpath returns the base unchanged
        #[test]
        fn join_empty_subpath_is_identity(base in "/[a-z0-9/]*") {
            prop_assert_eq!(join_repository_path(&base, ""), base);
        }

        /// Property: the joined path always ends with the subpath
        #[test]
        fn join_ends_with_subpath(
            base in "/[a-z0-9]+(/[a-z0-9]+)*",
            subpath in "[a-z0-9]+(/[a-z0-9.]+)*",
        ) {
            let joined = join_repository_path(&base, &subpath);
            let suffix = format!("/{}", subpath);
            prop_assert!(joined.ends_with(&suffix));
            prop_assert!(joined.starts_with(&base));
        }

        /// Property: joining never produces a doubled separator
        #[test]
        fn join_never_doubles_separator(
            base in "/([a-z0-9]+/?)*",
            subpath in "[a-z0-9]+(/[a-z0-9]+)*",
        ) {
            let joined = join_repository_path(&base, &subpath);
            prop_assert!(!joined.contains("//"), "doubled separator in {}", joined);
        }

        /// Property: every joined path matches the '<base>/**' glob
        #[test]
        fn joined_path_matches_recursive_glob(
            base in "/[a-z0-9]+",
            subpath in "[a-z0-9]+(/[a-z0-9]+)*",
        ) {
            let joined = join_repository_path(&base, &subpath);
            let pattern = format!("{}/**", base);
            prop_assert!(glob_match(&pattern, &joined).unwrap());
        }
    }
}
