//! Knative serving dashboard module: content-path routing, view assembly,
//! and action dispatch over an externally owned object store.

pub mod accessor;
pub mod actions;
pub mod component;
pub mod conditions;
pub mod linker;
pub mod metadata;
pub mod object;
pub mod plugin;
pub mod reference;
pub mod router;
pub mod serving;
pub mod store;
pub mod yaml;

pub type Result<T> = anyhow::Result<T>;

pub use component::Component;
pub use linker::Linker;
pub use plugin::{ContentResponse, Navigation, Plugin};
pub use reference::{Kind, ObjectRef, Selector};
pub use router::{Handler, Params, resolve};
pub use store::{DashboardClient, MemoryStore, RecordedEvent, load_seed};
