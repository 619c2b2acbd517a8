//! Storage nodes (files, folders and shortcuts) and copy manifest entries.
//!
//! The storage service describes every entry with a loosely typed record
//! that only differs by its MIME type. [`Node`] resolves that record once,
//! at the point it is received, into a [`NodeKind`]; everything downstream
//! matches on the kind instead of comparing MIME type strings.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};


/// MIME type the storage service uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type the storage service uses for shortcuts.
pub const SHORTCUT_MIME_TYPE: &str = "application/vnd.google-apps.shortcut";



/// An opaque identifier of a node in the storage service.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a raw identifier.
    pub fn new<S>(id: S) -> Self
    where
        S: Into<String>,
    {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty (i.e. absent).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}



/// The node a shortcut points to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ShortcutTarget {
    /// Identifier of the target node.
    pub id: NodeId,

    /// MIME type of the target node, if the service reported it.
    pub mime_type: Option<String>,
}

impl ShortcutTarget {
    /// Returns `true` if the shortcut points to a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}


/// What kind of entry a [`Node`] is.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// A plain file (anything that is neither a folder nor a shortcut).
    File {
        /// The file's MIME type.
        mime_type: String,
    },

    /// A folder.
    Folder,

    /// A shortcut to some other node.
    ///
    /// `target` is `None` when the service did not report a target
    /// (an unresolvable shortcut).
    Shortcut {
        /// The shortcut's target, if resolvable.
        target: Option<ShortcutTarget>,
    },
}

impl NodeKind {
    /// Resolves a node kind from a MIME type and (for shortcuts) its target details.
    pub fn from_mime_type(mime_type: &str, shortcut_target: Option<ShortcutTarget>) -> Self {
        match mime_type {
            FOLDER_MIME_TYPE => Self::Folder,
            SHORTCUT_MIME_TYPE => Self::Shortcut {
                target: shortcut_target,
            },
            other => Self::File {
                mime_type: other.to_string(),
            },
        }
    }

    /// Returns the MIME type this kind corresponds to.
    pub fn mime_type(&self) -> &str {
        match self {
            NodeKind::File { mime_type } => mime_type,
            NodeKind::Folder => FOLDER_MIME_TYPE,
            NodeKind::Shortcut { .. } => SHORTCUT_MIME_TYPE,
        }
    }
}


/// A single entry in the storage service.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Node {
    /// Identifier of the node.
    pub id: NodeId,

    /// Display name of the node.
    pub name: String,

    /// What kind of node this is.
    pub kind: NodeKind,

    /// Identifiers of the node's parents.
    ///
    /// The storage service allows multiple parents, and the root of a drive has none.
    pub parents: Vec<NodeId>,

    /// A link that opens the node in the service's web interface.
    pub web_view_link: Option<String>,
}

impl Node {
    /// Returns `true` if this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    /// If this node is a shortcut with a resolvable target, returns that target.
    pub fn shortcut_target(&self) -> Option<&ShortcutTarget> {
        match &self.kind {
            NodeKind::Shortcut { target } => target.as_ref(),
            _ => None,
        }
    }

    /// Builds the manifest entry describing this node.
    pub fn to_manifest_entry(&self) -> ManifestEntry {
        ManifestEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            web_view_link: self.web_view_link.clone(),
            mime_type: self.kind.mime_type().to_string(),
        }
    }
}



/// One record per file or folder created during a copy.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Identifier of the created node.
    pub id: NodeId,

    /// Name of the created node.
    pub name: String,

    /// Link to the created node.
    pub web_view_link: Option<String>,

    /// MIME type of the created node.
    pub mime_type: String,
}

impl ManifestEntry {
    /// Returns `true` if the entry describes a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}
