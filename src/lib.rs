pub mod boundary;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod manager;
pub mod ui;

pub use config::{load_config, Config};
pub use domain::{Branch, BuildType, Tag, Version};
pub use error::{Result, TagkeeperError};
pub use manager::TagLifecycleManager;
