use drive_grant::node::NodeId;

use crate::storage::InMemoryStorage;


/// Number of nested folders in a [`DeepTree`].
pub const DEEP_TREE_DEPTH: usize = 6;

/// Number of files directly inside the template of a [`DeepTree`].
pub const DEEP_TREE_WIDE_FILES: usize = 7;


/// A template with deep nesting and a wide top level:
///
/// ```md
/// Root/
/// ├─ Template/
/// │  ├─ file-01.txt .. file-07.txt
/// │  └─ level-1/
/// │     ├─ level-1.txt
/// │     └─ level-2/
/// │        ├─ level-2.txt
/// │        └─ ... down to level-6/
/// └─ Destination/
/// ```
pub struct DeepTree {
    pub storage: InMemoryStorage,

    pub root: NodeId,

    pub template: NodeId,

    /// `level-1` through `level-6`, outermost first.
    pub levels: Vec<NodeId>,

    /// An empty folder outside the template.
    pub destination: NodeId,
}

impl DeepTree {
    pub fn new() -> Self {
        Self::with_storage(InMemoryStorage::new())
    }

    /// Builds the tree with listings paginated to `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::with_storage(InMemoryStorage::with_page_size(page_size))
    }

    fn with_storage(storage: InMemoryStorage) -> Self {
        let root = storage.add_root_folder("Root");
        let template = storage.add_folder("Template", &root);

        for file_index in 1..=DEEP_TREE_WIDE_FILES {
            storage.add_file(&format!("file-{:02}.txt", file_index), &template);
        }

        let mut levels = Vec::with_capacity(DEEP_TREE_DEPTH);
        let mut parent = template.clone();

        for depth in 1..=DEEP_TREE_DEPTH {
            let level = storage.add_folder(&format!("level-{}", depth), &parent);
            storage.add_file(&format!("level-{}.txt", depth), &level);

            levels.push(level.clone());
            parent = level;
        }

        let destination = storage.add_folder("Destination", &root);

        Self {
            storage,
            root,
            template,
            levels,
            destination,
        }
    }

    /// Relative paths of everything inside the template, in depth-first pre-order.
    pub fn expected_template_paths() -> Vec<String> {
        let mut paths: Vec<String> = (1..=DEEP_TREE_WIDE_FILES)
            .map(|file_index| format!("file-{:02}.txt", file_index))
            .collect();

        let mut prefix = String::new();
        for depth in 1..=DEEP_TREE_DEPTH {
            prefix.push_str(&format!("level-{}/", depth));

            paths.push(prefix.clone());
            paths.push(format!("{}level-{}.txt", prefix, depth));
        }

        paths
    }
}

impl Default for DeepTree {
    fn default() -> Self {
        Self::new()
    }
}
