//! Resource abstraction layer
//!
//! - [`catalog`] - The closed set of resources and the styles each supports
//! - [`request`] - Validated requests and their URL rendering
//!
//! # Example
//!
//! ```
//! use phishnet::resource::{QueryParams, ResourceKind, ResourceRequest};
//!
//! let request = ResourceRequest::by_id(ResourceKind::Songs, 42, QueryParams::new()).unwrap();
//! assert_eq!(request.path(), "songs/42");
//! ```

pub mod catalog;
pub mod request;

pub use catalog::{
    get_all_resource_keys, get_registry, get_resource, QueryStyle, QueryableColumn, ResourceDef,
    ResourceKind, SortDirection, ValueKind,
};
pub use request::{QueryParams, QueryValue, RequestShape, ResourceRequest, DATE_FORMAT};
