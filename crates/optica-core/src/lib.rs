//! # optica-core: Pure Screen Logic for the Optica Admin Console
//!
//! Everything a management screen computes, as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Optica Admin Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    optica-console (CLI)                         │   │
//! │  │    list <screen> ──► page window      promotions ──► stats      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ pipeline  │  │ paginator │  │field_store│  │  pricing  │  │   │
//! │  │   │ search    │  │ PageInfo  │  │ Validator │  │ Promotion │  │   │
//! │  │   │ filter    │  │  slice    │  │ ErrorMap  │  │ PriceState│  │   │
//! │  │   │ sort      │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │           screen (ScreenState reducer) + screens/*              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK READS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ records in, payloads out              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 optica-api (HTTP boundary)                      │   │
//! │  │        fetch lists / reference tables, submit payloads          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity schemas (Product, Client, Employee, Branch, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`promotion`] - Promotions, lifecycle status, price descriptors
//! - [`pipeline`] - Search → filters → sort
//! - [`paginator`] - Page window over the pipeline output
//! - [`field_store`] / [`validation`] - Form values and rules
//! - [`pricing`] - Effective price resolution
//! - [`screen`] - Per-screen state and reducer
//! - [`screens`] - Listing and form definitions of each screen
//!
//! ## Example Usage
//!
//! ```rust
//! use optica_core::money::{Money, Percentage};
//! use optica_core::pricing::compute_effective;
//! use optica_core::promotion::{Discount, PromotionDescriptor};
//!
//! let summer = PromotionDescriptor {
//!     id: "verano".to_string(),
//!     discount: Discount::Percentage(Percentage::from_percent(20.0)),
//!     valid_until: None,
//! };
//!
//! let price = compute_effective(Money::from_cents(10000), true, Some(&summer), None);
//! assert_eq!(price.effective.cents(), 8000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod field_store;
pub mod lenient;
pub mod money;
pub mod paginator;
pub mod payload;
pub mod pipeline;
pub mod pricing;
pub mod promotion;
pub mod reference;
pub mod screen;
pub mod screens;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pipeline::{FilterSpec, ListContext, Listable, SortDirection, SortKey};
pub use screen::{ScreenAction, ScreenSettings, ScreenState};
pub use screens::ScreenKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Rows per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a screen accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Longest accepted search term, in characters.
pub const MAX_SEARCH_LEN: usize = 100;

/// Seconds a success/error notification stays visible.
pub const DEFAULT_NOTIFICATION_SECS: u64 = 5;

/// Filter values meaning "no constraint".
pub const ALL_SENTINELS: &[&str] = &["todos", "todas", "all"];
