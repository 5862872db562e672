//! # Stager
//!
//! Release-time decisions for artifacts published to Maven-layout repositories.
//!
//! Stager answers the three questions a build driver asks before it uploads
//! anything: which version should this build carry, has that exact version
//! already been pushed, and what goes into the POM manifest.
//!
//! ## Pipeline
//!
//! 1. [`version`] derives the candidate version: snapshot form, release form,
//!    or the next sequential alpha read from the remote `maven-metadata.xml`.
//! 2. [`guard::PublicationGuard`] probes the release and staging repositories
//!    for the exact artifact and reports whether publication should be skipped.
//! 3. [`pom::translate`] turns the human-authored `PUBLISHERS.yml` description
//!    into a [`pom::PomDescriptor`], and [`pom::render_pom`] writes it out.
//!
//! [`engine::plan_release`] runs all three for one invocation.
//!
//! ## Example
//!
//! ```ignore
//! use std::path::Path;
//! use stager::config::{CliOverrides, StagerConfig};
//! use stager::engine::{self, Mode};
//! use stager_registry::HttpProbe;
//!
//! let config = StagerConfig::load_from_dir(Path::new("."))?.unwrap_or_default();
//! let settings = config.build_settings(Path::new("."), CliOverrides::default())?;
//! let probe = HttpProbe::with_timeouts(settings.connect_timeout, settings.read_timeout);
//! let plan = engine::plan_release(&settings, &probe, Mode::Alpha, &mut reporter)?;
//! println!("{}", plan.version());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: versions, coordinates and repository targets
//! - [`version`]: snapshot/release conversion and alpha sequencing
//! - [`guard`]: duplicate-publish detection
//! - [`pom`]: project description translation and POM rendering
//! - [`config`]: `.stager.toml` loading and merging
//! - [`auth`]: repository credential resolution
//! - [`properties`]: version write-back into `gradle.properties`
//! - [`engine`]: the release plan and the [`engine::Reporter`] seam

/// Repository credentials from `.stager.toml` or the environment.
pub mod auth;

/// Configuration file (`.stager.toml`) loading and merging.
pub mod config;

/// Release planning and progress reporting.
pub mod engine;

/// Error taxonomy shared by every component.
pub mod error;

/// Duplicate-publish detection against release and staging repositories.
pub mod guard;

/// Project description translation and POM rendering.
pub mod pom;

/// `version = ...` write-back into properties files.
pub mod properties;

/// Domain types: versions, coordinates, repository targets.
pub mod types;

/// Version lifecycle derivation.
pub mod version;

pub use error::{Result, StagerError};
