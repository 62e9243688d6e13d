//! # Suitectl Architecture
//!
//! Suitectl is the **controller layer** of a test-data editor. It sits between
//! parsed test data (settings, variables and imports of suites, resource files,
//! tests and keywords) and whatever UI edits them. It does not parse or write
//! files; it decides what an edit means.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade: ids in, values and EditResults out          │
//! │  - Owns the store and the ControllerConfig                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller Layer (controller/*.rs)                         │
//! │  - Edit form parsing, change detection, dirty marking       │
//! │  - Tag inheritance, import resolution                       │
//! │  - Returns notifications, never publishes them              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract RecordStore trait                               │
//! │  - InMemoryStore arena (tests, in-memory applications)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Edit Form
//!
//! Multi-token values are edited as one string with ` | ` between tokens and
//! `\|` for a literal pipe. [`text::split_value`] reads that form back. Every
//! controller compares the *parsed* input with the stored value, so
//! re-submitting what `value()` returned is never a change.
//!
//! ## Key Principle: No I/O in Controllers
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types
//! (`Result<EditResult>`). Only [`config`] touches the filesystem, and only
//! when asked to load or save.
//!
//! ## Testing Strategy
//!
//! 1. **Controllers** (`controller/*.rs`): unit tests against `InMemoryStore`
//!    built with `store::memory::fixtures::SuiteFixture`. Most tests live here.
//! 2. **API** (`api.rs`): dispatch tests.
//! 3. **Integration** (`tests/`): whole editing sessions through [`api::SuiteApi`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`controller`]: Setting, tags, documentation, metadata, variable and import controllers
//! - [`store`]: Storage abstraction and the in-memory implementation
//! - [`model`]: Record types (`Entity`, `Setting`, `Variable`, `Import`)
//! - [`text`]: Edit form, name matching, escapes and HTML rendering
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;
pub mod text;
