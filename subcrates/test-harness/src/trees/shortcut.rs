use drive_grant::node::NodeId;

use crate::storage::InMemoryStorage;


/// MIME type of `Shared/shared.pdf` in a [`ShortcutTree`].
pub const PDF_MIME_TYPE: &str = "application/pdf";


/// A template that reaches outside of itself (and back into itself) through shortcuts:
///
/// ```md
/// Root/
/// ├─ Shared/
/// │  ├─ shared.pdf
/// │  └─ Assets/
/// │     └─ logo.png
/// ├─ Template/
/// │  ├─ Readme.txt
/// │  ├─ Manual           -> Shared/shared.pdf
/// │  ├─ Media            -> Shared/Assets
/// │  ├─ Broken           -> (unresolvable)
/// │  └─ Nested/
/// │     └─ Back to start -> Template
/// └─ Destination/
/// ```
pub struct ShortcutTree {
    pub storage: InMemoryStorage,

    pub root: NodeId,

    /// `Root/Shared/shared.pdf`
    pub shared_pdf: NodeId,

    /// `Root/Shared/Assets`
    pub assets: NodeId,

    /// `Root/Shared/Assets/logo.png`
    pub logo_png: NodeId,

    pub template: NodeId,

    /// Shortcut to `shared.pdf`.
    pub manual_shortcut: NodeId,

    /// Shortcut to `Assets`.
    pub media_shortcut: NodeId,

    /// Shortcut without a target.
    pub broken_shortcut: NodeId,

    /// Shortcut (inside `Template/Nested`) back to `Template`.
    pub cyclic_shortcut: NodeId,

    /// An empty folder outside the template.
    pub destination: NodeId,
}

impl ShortcutTree {
    pub fn new() -> Self {
        let storage = InMemoryStorage::new();

        let root = storage.add_root_folder("Root");

        let shared = storage.add_folder("Shared", &root);
        let shared_pdf = storage.add_file_with_mime_type("shared.pdf", &shared, PDF_MIME_TYPE);
        let assets = storage.add_folder("Assets", &shared);
        let logo_png = storage.add_file_with_mime_type("logo.png", &assets, "image/png");

        let template = storage.add_folder("Template", &root);
        storage.add_file("Readme.txt", &template);
        let manual_shortcut = storage.add_shortcut("Manual", &template, &shared_pdf);
        let media_shortcut = storage.add_shortcut("Media", &template, &assets);
        let broken_shortcut = storage.add_unresolvable_shortcut("Broken", &template);
        let nested = storage.add_folder("Nested", &template);
        let cyclic_shortcut = storage.add_shortcut("Back to start", &nested, &template);

        let destination = storage.add_folder("Destination", &root);

        Self {
            storage,
            root,
            shared_pdf,
            assets,
            logo_png,
            template,
            manual_shortcut,
            media_shortcut,
            broken_shortcut,
            cyclic_shortcut,
            destination,
        }
    }
}

impl Default for ShortcutTree {
    fn default() -> Self {
        Self::new()
    }
}
