//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the merged
//! repository path tree of every mapping in a hierarchical format.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use indexmap::IndexMap;
use ptree::{print_tree, TreeItem};
use std::path::Path;

use crate::commands::load_session;
use repo_overlay::mapping::PathMapping;

/// Display the repository path tree of each mapping
#[derive(Args, Debug, Default)]
pub struct TreeArgs {
    /// Maximum depth to display below each mapped path.
    ///
    /// If not specified, displays the full tree.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(config_path: &Path, args: TreeArgs) -> Result<()> {
    let session = load_session(config_path)?;
    let max_depth = args.depth.unwrap_or(usize::MAX);

    for &id in &session.mappings {
        let mapping = session.overlay.mapping(id)?;
        let root = build_tree(mapping, max_depth)?;
        print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    }

    Ok(())
}

/// Nested path segments, in the order the mapping lists them
#[derive(Default)]
struct Segments(IndexMap<String, Segments>);

impl Segments {
    fn insert(&mut self, relative: &str, max_depth: usize) {
        let mut node = self;
        for (depth, segment) in relative.split('/').enumerate() {
            if depth >= max_depth {
                break;
            }
            node = node.0.entry(segment.to_string()).or_default();
        }
    }

    fn into_nodes(self) -> Vec<TreeNode> {
        self.0
            .into_iter()
            .map(|(label, children)| TreeNode {
                label,
                children: children.into_nodes(),
            })
            .collect()
    }
}

fn build_tree(mapping: &PathMapping, max_depth: usize) -> Result<TreeNode> {
    let root_path = mapping.repository_path();
    let mut segments = Segments::default();
    for path in mapping.list_repository_paths()? {
        let relative = path
            .strip_prefix(root_path)
            .unwrap_or(path)
            .trim_start_matches('/');
        if !relative.is_empty() {
            segments.insert(relative, max_depth);
        }
    }

    Ok(TreeNode {
        label: format!(
            "{} ({}, {})",
            root_path,
            mapping.containing_package()?.name(),
            mapping.state()?
        ),
        children: segments.into_nodes(),
    })
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
