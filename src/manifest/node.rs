/// Manifest tree types
///
/// The manifest is an owned tree: a page node is assembled only after every
/// child it declared has settled, then handed to its parent by value.
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// One crawled page or one resolved document reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ManifestNode {
    /// A crawled page; everything under it lands in a directory named `title`
    Page {
        title: String,
        location: Url,
        /// Children keyed by the raw reference token found on the page
        children: BTreeMap<String, ManifestNode>,
    },

    /// A fully resolved document to download
    Document { location: Url },
}

impl ManifestNode {
    /// Creates a page node from its already-settled children
    pub fn page(
        title: impl Into<String>,
        location: Url,
        children: BTreeMap<String, ManifestNode>,
    ) -> Self {
        Self::Page {
            title: title.into(),
            location,
            children,
        }
    }

    /// Creates a document leaf
    pub fn document(location: Url) -> Self {
        Self::Document { location }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    /// Returns the page title, or `None` for documents
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Page { title, .. } => Some(title),
            Self::Document { .. } => None,
        }
    }

    pub fn location(&self) -> &Url {
        match self {
            Self::Page { location, .. } | Self::Document { location } => location,
        }
    }

    /// Returns the children of a page (documents have none)
    pub fn children(&self) -> Option<&BTreeMap<String, ManifestNode>> {
        match self {
            Self::Page { children, .. } => Some(children),
            Self::Document { .. } => None,
        }
    }

    /// Counts document leaves at or below this node
    pub fn document_count(&self) -> usize {
        match self {
            Self::Document { .. } => 1,
            Self::Page { children, .. } => children.values().map(Self::document_count).sum(),
        }
    }

    /// Counts page nodes at or below this node
    pub fn page_count(&self) -> usize {
        match self {
            Self::Document { .. } => 0,
            Self::Page { children, .. } => {
                1 + children.values().map(Self::page_count).sum::<usize>()
            }
        }
    }

    /// Collects every document location at or below this node, depth first
    pub fn document_locations(&self) -> Vec<&Url> {
        let mut locations = Vec::new();
        self.collect_documents(&mut locations);
        locations
    }

    fn collect_documents<'a>(&'a self, out: &mut Vec<&'a Url>) {
        match self {
            Self::Document { location } => out.push(location),
            Self::Page { children, .. } => {
                for child in children.values() {
                    child.collect_documents(out);
                }
            }
        }
    }
}

/// The root of the manifest: seed location to the node it produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    roots: BTreeMap<String, ManifestNode>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the settled node produced by a seed
    pub fn insert(&mut self, seed: impl Into<String>, node: ManifestNode) {
        self.roots.insert(seed.into(), node);
    }

    pub fn get(&self, seed: &str) -> Option<&ManifestNode> {
        self.roots.get(seed)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of seeds that produced a node
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ManifestNode)> {
        self.roots.iter()
    }

    pub fn document_count(&self) -> usize {
        self.roots.values().map(ManifestNode::document_count).sum()
    }

    pub fn page_count(&self) -> usize {
        self.roots.values().map(ManifestNode::page_count).sum()
    }

    /// Every document location in the manifest, depth first
    pub fn document_locations(&self) -> Vec<&Url> {
        self.roots
            .values()
            .flat_map(|node| node.document_locations())
            .collect()
    }

    /// Serializes the manifest as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the manifest dump to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
