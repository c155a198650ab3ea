//! The three endpoint groups generated for every resource.
//!
//! Route patterns per resource name `R`:
//!
//! | Pattern                              | Group                  |
//! |--------------------------------------|------------------------|
//! | `/R`                                 | [`CollectionEndpoint`] |
//! | `/R/{instance_id}`                   | [`InstanceEndpoint`]   |
//! | `/R/{instance_id}/{property_name}`   | [`PropertyEndpoint`]   |
//!
//! All patterns are registered with a wildcard method; verb resolution
//! happens in [`dispatch`](crate::dispatch::dispatch).

pub mod collection;
pub mod instance;
pub mod property;

pub use collection::CollectionEndpoint;
pub use instance::InstanceEndpoint;
pub use property::PropertyEndpoint;

use std::fmt;

/// Path variable holding the instance id.
pub const PARAM_INSTANCE_ID: &str = "instance_id";

/// Path variable holding the property name.
pub const PARAM_PROPERTY_NAME: &str = "property_name";

/// Endpoint category, used for route tagging and hook keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// `/R`
    Collection,
    /// `/R/{instance_id}`
    Instance,
    /// `/R/{instance_id}/{property_name}`
    Property,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collection => "collection",
            Self::Instance => "instance",
            Self::Property => "property",
        };
        f.write_str(name)
    }
}
