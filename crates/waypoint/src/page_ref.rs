//! References to controllers, extensions and views.
//!
//! Routes name their page parts either by a registry name or by a
//! constructor value. Two references are the same page part when their names
//! are equal or when they point at the same constructor.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::controller::{Controller, Extension};
use crate::renderer::View;

#[derive(Clone)]
pub enum PageRef {
    /// Resolved through the page factory's registry
    Name(String),
    /// A constructor value, compared by identity
    Constructor {
        label: &'static str,
        handle: Arc<dyn Any + Send + Sync>,
    },
}

impl PageRef {
    pub fn name(name: impl Into<String>) -> Self {
        PageRef::Name(name.into())
    }

    /// Reference a controller by its constructor
    pub fn controller<C, F>(construct: F) -> Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self::constructor::<F, _>(ControllerConstructor::new(move || {
            Box::new(construct()) as Box<dyn Controller>
        }))
    }

    /// Reference an extension by its constructor
    pub fn extension<E, F>(construct: F) -> Self
    where
        E: Extension + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self::constructor::<F, _>(ExtensionConstructor::new(move || {
            Box::new(construct()) as Box<dyn Extension>
        }))
    }

    /// Reference a view by its constructor
    pub fn view<V, F>(construct: F) -> Self
    where
        V: View + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self::constructor::<F, _>(ViewConstructor::new(move || Arc::new(construct()) as Arc<dyn View>))
    }

    fn constructor<F: 'static, H: Any + Send + Sync>(handle: H) -> Self {
        PageRef::Constructor {
            label: std::any::type_name::<F>(),
            handle: Arc::new(handle),
        }
    }

    /// Human readable form for logs and errors
    pub fn label(&self) -> &str {
        match self {
            PageRef::Name(name) => name,
            PageRef::Constructor { label, .. } => label,
        }
    }

    pub fn same_as(&self, other: &PageRef) -> bool {
        match (self, other) {
            (PageRef::Name(a), PageRef::Name(b)) => a == b,
            (PageRef::Constructor { handle: a, .. }, PageRef::Constructor { handle: b, .. }) => {
                std::ptr::eq(
                    Arc::as_ptr(a) as *const (),
                    Arc::as_ptr(b) as *const (),
                )
            }
            _ => false,
        }
    }

    pub(crate) fn downcast<T: 'static>(&self) -> Option<&T> {
        match self {
            PageRef::Name(_) => None,
            PageRef::Constructor { handle, .. } => handle.downcast_ref::<T>(),
        }
    }
}

impl PartialEq for PageRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            PageRef::Constructor { label, .. } => f.debug_tuple("Constructor").field(label).finish(),
        }
    }
}

impl From<&str> for PageRef {
    fn from(name: &str) -> Self {
        PageRef::name(name)
    }
}

impl From<String> for PageRef {
    fn from(name: String) -> Self {
        PageRef::Name(name)
    }
}

macro_rules! constructor {
    ($(#[$doc:meta])* $name:ident => $output:ty) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn Fn() -> $output + Send + Sync>);

        impl $name {
            pub fn new(construct: impl Fn() -> $output + Send + Sync + 'static) -> Self {
                Self(Arc::new(construct))
            }

            pub fn construct(&self) -> $output {
                (self.0)()
            }
        }
    };
}

constructor!(
    /// Builds a fresh controller for every mount
    ControllerConstructor => Box<dyn Controller>
);
constructor!(
    /// Builds a fresh extension for every mount
    ExtensionConstructor => Box<dyn Extension>
);
constructor!(ViewConstructor => Arc<dyn View>);
