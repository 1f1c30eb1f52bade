// File: src/meta.rs
// Purpose: Document metadata collected by controllers for the document view

use indexmap::IndexMap;

/// Title, `<meta>` and `<link>` entries for the rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaManager {
    title: String,
    names: IndexMap<String, String>,
    properties: IndexMap<String, String>,
    links: IndexMap<String, String>,
}

impl MetaManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `<meta name=.. content=..>`
    pub fn set_meta_name(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.names.insert(name.into(), content.into());
        self
    }

    pub fn meta_name(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn meta_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `<meta property=.. content=..>`
    pub fn set_meta_property(&mut self, property: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.properties.insert(property.into(), content.into());
        self
    }

    pub fn meta_property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn meta_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `<link rel=.. href=..>`
    pub fn set_link(&mut self, rel: impl Into<String>, href: impl Into<String>) -> &mut Self {
        self.links.insert(rel.into(), href.into());
        self
    }

    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(String::as_str)
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
