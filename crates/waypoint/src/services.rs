// File: src/services.rs
// Purpose: Application services shared with every controller and extension

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

use crate::dictionary::Dictionary;
use crate::meta::MetaManager;
use crate::router::Links;

/// Cheap-to-clone bundle of page services
#[derive(Clone, Default)]
pub struct PageServices {
    meta: Arc<Mutex<MetaManager>>,
    links: Links,
    dictionary: Arc<Dictionary>,
    settings: Arc<Value>,
}

impl PageServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn meta(&self) -> MutexGuard<'_, MetaManager> {
        self.meta.lock()
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn settings(&self) -> &Value {
        &self.settings
    }
}

impl fmt::Debug for PageServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageServices")
            .field("links", &self.links)
            .field("language", &self.dictionary.language())
            .finish_non_exhaustive()
    }
}
