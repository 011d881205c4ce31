//! sous-lib: provisioning ingredients onto a host.
//!
//! - [`ingredient`]: named, versioned requests and their definitions
//! - [`rules`]: platform/distro/release override declarations and resolution
//! - [`resolve`]: dependency tree, build sequence and satisfiability
//! - [`execute`]: drives a build sequence against package managers
//! - [`kitchen`]: the end-to-end orchestration

pub mod catalog;
pub mod config;
pub mod consts;
pub mod execute;
pub mod ingredient;
pub mod kitchen;
pub mod manager;
pub mod platform;
pub mod registry;
pub mod resolve;
pub mod rules;
pub mod util;

pub use config::Config;
pub use kitchen::{CookReport, Kitchen, KitchenError, Plan};
pub use platform::Host;
