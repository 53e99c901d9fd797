pub mod cli;
pub mod commands;
pub mod config;
pub mod datafile;
pub mod error;
pub mod logging;
pub mod model;
pub mod page;
pub mod registry;
pub mod render;
pub mod site;
pub mod types;

pub use error::{DataFileError, RegistryError, Result};
pub use model::{DisplayModel, ImplementorList};
pub use page::{InstallPoint, PageReport, load_page};
pub use registry::{ImplementorSink, Registry, RegistryState, StagingPolicy};
pub use render::{HtmlRenderer, Renderer};
pub use site::{Site, TraitPath};
pub use types::{CrateName, Implementor, Payload};
