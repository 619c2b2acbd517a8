//! Pre-built storage trees.
//!
//! Every tree lives in its own [`InMemoryStorage`] and exposes the ids of its interesting nodes.

use drive_grant::node::NodeId;

use crate::storage::InMemoryStorage;

mod deep;
mod shortcut;

pub use deep::*;
pub use shortcut::*;



/// A small storefront:
///
/// ```md
/// My Drive/
/// ├─ Products/
/// │  └─ Template/
/// │     ├─ Docs/
/// │     │  └─ a.txt
/// │     └─ root.txt
/// └─ Orders/
/// ```
pub struct StorefrontTree {
    pub storage: InMemoryStorage,

    /// `My Drive` (has no parents).
    pub my_drive: NodeId,

    /// `My Drive/Products`
    pub products: NodeId,

    /// `My Drive/Products/Template`
    pub template: NodeId,

    /// `My Drive/Products/Template/Docs`
    pub docs: NodeId,

    /// `My Drive/Products/Template/Docs/a.txt`
    pub a_txt: NodeId,

    /// `My Drive/Products/Template/root.txt`
    pub root_txt: NodeId,

    /// `My Drive/Orders`
    pub orders: NodeId,
}

impl StorefrontTree {
    pub fn new() -> Self {
        Self::with_storage(InMemoryStorage::new())
    }

    /// Builds the tree with listings paginated to `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::with_storage(InMemoryStorage::with_page_size(page_size))
    }

    fn with_storage(storage: InMemoryStorage) -> Self {
        let my_drive = storage.add_root_folder("My Drive");
        let products = storage.add_folder("Products", &my_drive);

        let template = storage.add_folder("Template", &products);
        let docs = storage.add_folder("Docs", &template);
        let a_txt = storage.add_file("a.txt", &docs);
        let root_txt = storage.add_file("root.txt", &template);

        let orders = storage.add_folder("Orders", &my_drive);

        Self {
            storage,
            my_drive,
            products,
            template,
            docs,
            a_txt,
            root_txt,
            orders,
        }
    }
}

impl Default for StorefrontTree {
    fn default() -> Self {
        Self::new()
    }
}
