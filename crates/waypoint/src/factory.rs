//! Turning page references into controller, extension and view instances.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::ValidationMode;
use crate::controller::{Controller, DecoratedController, Extension, ManagedExtension, PageContext};
use crate::error::PageFactoryError;
use crate::page_ref::{ControllerConstructor, ExtensionConstructor, PageRef, ViewConstructor};
use crate::renderer::View;
use crate::state::{RestrictedStateManager, StateHandle};

/// Builds page parts for the page manager
pub trait PageFactory: Send + Sync {
    fn create_controller(&self, reference: &PageRef) -> Result<Box<dyn Controller>, PageFactoryError>;

    fn create_extension(&self, reference: &PageRef) -> Result<Box<dyn Extension>, PageFactoryError>;

    fn create_view(&self, reference: &PageRef) -> Result<Arc<dyn View>, PageFactoryError>;

    /// Wire a controller to its context and give each extension a
    /// restricted view of the controller's state.
    fn decorate_controller(
        &self,
        controller: Box<dyn Controller>,
        extensions: Vec<Box<dyn Extension>>,
        context: PageContext,
        mode: ValidationMode,
    ) -> DecoratedController {
        let extensions = extensions
            .into_iter()
            .map(|extension| {
                let allowed = extension.allowed_state_keys().into_iter().collect();
                let state = self.decorate_page_state_manager(context.state(), allowed, mode);
                ManagedExtension::new(extension, context.with_state(state))
            })
            .collect();
        DecoratedController::new(controller, context, extensions)
    }

    fn decorate_page_state_manager(
        &self,
        state: &StateHandle,
        allowed: BTreeSet<String>,
        mode: ValidationMode,
    ) -> StateHandle {
        Arc::new(RestrictedStateManager::new(Arc::clone(state), allowed, mode))
    }
}

/// A [`PageFactory`] backed by named constructors.
///
/// Constructor references are used directly; names are looked up in the
/// registry.
#[derive(Clone, Default)]
pub struct RegistryPageFactory {
    controllers: HashMap<String, ControllerConstructor>,
    extensions: HashMap<String, ExtensionConstructor>,
    views: HashMap<String, ViewConstructor>,
}

impl RegistryPageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controller<C, F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.insert(
            name.into(),
            ControllerConstructor::new(move || Box::new(construct()) as Box<dyn Controller>),
        );
        self
    }

    pub fn with_extension<E, F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        E: Extension + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.extensions.insert(
            name.into(),
            ExtensionConstructor::new(move || Box::new(construct()) as Box<dyn Extension>),
        );
        self
    }

    pub fn with_view<V, F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        V: View + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.views.insert(
            name.into(),
            ViewConstructor::new(move || Arc::new(construct()) as Arc<dyn View>),
        );
        self
    }
}

fn resolve<'a, C: 'static>(
    registry: &'a HashMap<String, C>,
    reference: &'a PageRef,
    kind: &'static str,
) -> Result<&'a C, PageFactoryError> {
    match reference {
        PageRef::Name(name) => registry.get(name).ok_or_else(|| PageFactoryError::Unresolved {
            kind,
            reference: name.clone(),
        }),
        PageRef::Constructor { label, .. } => {
            reference
                .downcast::<C>()
                .ok_or_else(|| PageFactoryError::NotAConstructor {
                    kind,
                    reference: label.to_string(),
                })
        }
    }
}

impl PageFactory for RegistryPageFactory {
    fn create_controller(&self, reference: &PageRef) -> Result<Box<dyn Controller>, PageFactoryError> {
        resolve(&self.controllers, reference, "controller").map(ControllerConstructor::construct)
    }

    fn create_extension(&self, reference: &PageRef) -> Result<Box<dyn Extension>, PageFactoryError> {
        resolve(&self.extensions, reference, "extension").map(ExtensionConstructor::construct)
    }

    fn create_view(&self, reference: &PageRef) -> Result<Arc<dyn View>, PageFactoryError> {
        resolve(&self.views, reference, "view").map(ViewConstructor::construct)
    }
}
