use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use maud::{html, Markup, DOCTYPE};
use tracing::warn;

use super::{DocumentView, RootView};
use crate::meta::MetaManager;
use crate::page_ref::PageRef;
use crate::state::State;

/// Minimal HTML shell used when a route names no document view
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocument;

impl DocumentView for DefaultDocument {
    fn render(&self, page: Markup, meta: &MetaManager, _state: &State) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (meta.title()) }
                    @for (name, content) in meta.meta_names() {
                        meta name=(name) content=(content);
                    }
                    @for (property, content) in meta.meta_properties() {
                        meta property=(property) content=(content);
                    }
                    @for (rel, href) in meta.links() {
                        link rel=(rel) href=(href);
                    }
                }
                body {
                    div id="page" { (page) }
                }
            }
        }
    }
}

/// Named document and root views available to renderers
#[derive(Clone)]
pub struct ViewRegistry {
    default_document: Arc<dyn DocumentView>,
    documents: HashMap<String, Arc<dyn DocumentView>>,
    roots: HashMap<String, Arc<dyn RootView>>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self {
            default_document: Arc::new(DefaultDocument),
            documents: HashMap::new(),
            roots: HashMap::new(),
        }
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_document(mut self, document: impl DocumentView + 'static) -> Self {
        self.default_document = Arc::new(document);
        self
    }

    pub fn with_document(mut self, name: impl Into<String>, document: impl DocumentView + 'static) -> Self {
        self.documents.insert(name.into(), Arc::new(document));
        self
    }

    pub fn with_root(mut self, name: impl Into<String>, root: impl RootView + 'static) -> Self {
        self.roots.insert(name.into(), Arc::new(root));
        self
    }

    /// The document view for `reference`, falling back to the default
    pub fn document(&self, reference: Option<&PageRef>) -> Arc<dyn DocumentView> {
        reference
            .and_then(|reference| lookup(&self.documents, reference, "document view"))
            .unwrap_or_else(|| Arc::clone(&self.default_document))
    }

    pub fn root(&self, reference: Option<&PageRef>) -> Option<Arc<dyn RootView>> {
        reference.and_then(|reference| lookup(&self.roots, reference, "managed root view"))
    }
}

fn lookup<T: ?Sized>(views: &HashMap<String, Arc<T>>, reference: &PageRef, kind: &str) -> Option<Arc<T>> {
    let found = match reference {
        PageRef::Name(name) => views.get(name).cloned(),
        PageRef::Constructor { .. } => None,
    };
    if found.is_none() {
        warn!(reference = reference.label(), kind, "view is not registered");
    }
    found
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("documents", &self.documents.keys().collect::<Vec<_>>())
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Framed;

    impl RootView for Framed {
        fn render(&self, page: Markup, _state: &State) -> Markup {
            html! { main { (page) } }
        }
    }

    #[test]
    fn test_default_document_renders_meta() {
        let mut meta = MetaManager::new();
        meta.set_title("Home").set_meta_name("description", "Landing");

        let html = DefaultDocument
            .render(html! { p { "hi" } }, &meta, &State::new())
            .into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains(r#"<meta name="description" content="Landing">"#));
        assert!(html.contains(r#"<div id="page"><p>hi</p></div>"#));
    }

    #[test]
    fn test_root_lookup() {
        let views = ViewRegistry::new().with_root("framed", Framed);
        assert!(views.root(Some(&PageRef::name("framed"))).is_some());
        assert!(views.root(Some(&PageRef::name("other"))).is_none());
        assert!(views.root(None).is_none());
    }
}
