//! Provider registry and the concurrent search sessions built on it.

pub mod driver;
pub mod provider;
pub mod registry;
pub mod result;
pub mod session;
pub mod stream;
pub mod view;

#[cfg(test)]
pub mod testing;

pub use provider::{ExecuteError, Provider};
pub use registry::Registry;
pub use result::{Icon, ProviderKind, ResultAction, ResultKey, SearchResult};
pub use stream::{SearchEvent, SearchStreams};
