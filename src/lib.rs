pub mod allocator;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod profile;
pub mod rule;

pub use allocator::{resolve_default_target, InputUsage};
pub use config::AppConfig;
pub use error::{RemapError, Result};
pub use host::{resolve_with_host, RemapHost, UsageSource, VirtualDeviceSource};
pub use input::{InputDescriptor, InputKind, VirtualDevice};
pub use profile::{ProfileEntry, RemapProfile, SkippedEntry};
pub use rule::{ActivationCondition, RemapRule};
