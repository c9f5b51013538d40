//! Resource descriptors
//!
//! A `ResourceDescriptor` is the caller-supplied handle naming a resource.
//! It is deliberately a thin trait so host applications can wire up their
//! own descriptor type (e.g. one backed by a database row) instead of the
//! reference `PathDescriptor` below.

/// A typed, path-addressed handle to one resource or folder.
pub trait ResourceDescriptor: Send + Sync + Clone {
    /// Namespace the key derivation and cache key use (e.g. `"document"`).
    fn resource_type(&self) -> &str;

    /// Forward-slash path, relative to the store root, with no leading slash.
    fn path(&self) -> &str;

    /// Whether this descriptor names a folder rather than an item.
    fn is_folder(&self) -> bool;

    /// Whether this descriptor names the root folder of its type.
    fn is_root_folder(&self) -> bool {
        self.is_folder() && self.path().is_empty()
    }
}

/// Reference `ResourceDescriptor` implementation addressing resources purely
/// by forward-slash path under a type namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescriptor {
    resource_type: String,
    path: String,
    is_folder: bool,
}

impl PathDescriptor {
    /// Build a descriptor for an item at `path`.
    #[must_use]
    pub fn item(resource_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            path: path.into(),
            is_folder: false,
        }
    }

    /// Build a descriptor for a folder at `path`. `path = ""` is the root folder.
    #[must_use]
    pub fn folder(resource_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            path: path.into(),
            is_folder: true,
        }
    }

    /// Derive a child item descriptor from this folder and a decoded child name.
    #[must_use]
    pub fn child_item(&self, name: &str) -> Self {
        Self::item(self.resource_type.clone(), join_path(&self.path, name))
    }

    /// Derive a child folder descriptor from this folder and a decoded child name.
    #[must_use]
    pub fn child_folder(&self, name: &str) -> Self {
        Self::folder(self.resource_type.clone(), join_path(&self.path, name))
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

impl ResourceDescriptor for PathDescriptor {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn is_folder(&self) -> bool {
        self.is_folder
    }
}
