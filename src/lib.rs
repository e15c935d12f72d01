#![doc = "longevity-curator: core pipeline for the daily health and longevity curator."]

//! This crate contains the selection, image resolution, caption and fan-out
//! logic. Concrete HTTP clients for content providers and platforms live in
//! the `longevity-curator-cli` crate and plug in through the traits in
//! [`contract`].
//!
//! # Usage
//! Build a [`run::Curator`] from a [`run::RunConfig`] and a
//! [`run::Collaborators`] table, then call [`run::Curator::run_once`].

pub mod blocklist;
pub mod caption;
pub mod content;
pub mod contract;
pub mod error;
pub mod imaging;
pub mod placeholder;
pub mod publish;
pub mod run;

pub use blocklist::Blocklist;
pub use caption::{build_caption, Caption};
pub use content::{ContentItem, ContentKind};
pub use error::{CuratorError, ImageError};
pub use imaging::{ImageResolver, ImageTier};
pub use publish::{publish_all, Platform, PublishResult};
pub use run::{Collaborators, Curator, PostMode, RunConfig, RunOutcome, RunReport, RunState};
