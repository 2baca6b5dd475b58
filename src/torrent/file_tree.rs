use std::collections::BTreeMap;

use crate::torrent::Content;

/// Suffix appended to a directory key that shares its name with a file.
pub const DIR_MARKER: char = '/';

/// A node of the directory hierarchy rebuilt from a flat file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
	File(u64),
	Directory(FileTree),
}

/// Directory contents keyed by path segment.
///
/// A directory whose name clashes with a file at the same level is stored
/// under `name/`, so both stay reachable. Should `name/` be taken as well,
/// markers keep being appended until the key is free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
	entries: BTreeMap<String, FileNode>,
}

impl FileTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&FileNode> {
		self.entries.get(key)
	}

	/// Entries in lexicographic key order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &FileNode)> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the directory to descend into for `segment`, creating it if needed.
	fn directory_mut(&mut self, segment: &str) -> &mut FileTree {
		let mut key = segment.to_string();
		while let Some(FileNode::File(_)) = self.entries.get(&key) {
			key.push(DIR_MARKER);
		}
		let node = self
			.entries
			.entry(key)
			.or_insert_with(|| FileNode::Directory(FileTree::new()));
		match node {
			FileNode::Directory(tree) => tree,
			FileNode::File(_) => unreachable!("file keys are skipped above"),
		}
	}

	fn insert_file(&mut self, name: &str, size: u64) {
		if let Some(FileNode::Directory(_)) = self.entries.get(name) {
			let mut key = format!("{}{}", name, DIR_MARKER);
			while self.entries.contains_key(&key) {
				key.push(DIR_MARKER);
			}
			if let Some(dir) = self.entries.remove(name) {
				self.entries.insert(key, dir);
			}
		}
		self.entries.insert(name.to_string(), FileNode::File(size));
	}
}

/// Rebuilds the directory hierarchy described by `files`.
///
/// Entries with an identical path overwrite each other; the document loader
/// rejects such lists before they get here.
pub fn build_tree(files: &[Content]) -> FileTree {
	let mut tree = FileTree::new();

	for file in files {
		let Some((name, parents)) = file.path.split_last() else {
			continue;
		};
		let mut current = &mut tree;
		for parent in parents {
			current = current.directory_mut(parent);
		}
		current.insert_file(name, file.size);
	}

	tree
}

/// Renders `tree` as box-drawing lines, each starting with `prefix`.
pub fn preview_tree(tree: &FileTree, prefix: &str) -> Vec<String> {
	let mut lines = Vec::new();
	let last = tree.len().saturating_sub(1);

	for (i, (key, node)) in tree.iter().enumerate() {
		let (branch, indent) = if i == last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
		match node {
			FileNode::File(size) => lines.push(format!("{}{} ({})", branch, key, size)),
			FileNode::Directory(sub) => {
				let marker = if key.ends_with(DIR_MARKER) { "" } else { "/" };
				lines.push(format!("{}{}{}", branch, key, marker));
				lines.extend(preview_tree(sub, indent));
			}
		}
	}

	lines.into_iter().map(|line| format!("{}{}", prefix, line)).collect()
}
