//! # bypass-core
//!
//! Decision core for proxy and gateway bypass lists.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Matchers** - exact IP, CIDR range and domain glob patterns
//! - **Rule sets** - OR-evaluation of matchers with optional reversal
//! - **Bypasser** - the shared, lock-protected evaluator callers query
//! - **Live reload** - line-format rule sources swapped in atomically,
//!   with an optional file-watching reload loop
//! - **Configuration** - TOML settings for embedding applications
//!
//! ## Example
//!
//! ```rust
//! use bypass_core::Bypasser;
//!
//! let bypasser = Bypasser::from_patterns(false, ["10.0.0.0/8", ".example.com"])?;
//! assert!(bypasser.bypass("10.1.2.3:443"));
//! assert!(bypasser.bypass("www.example.com"));
//!
//! // Swap in a new rule set while other threads keep querying
//! bypasser.reload("reverse true\nexample.com\n".as_bytes())?;
//! assert!(!bypasser.bypass("example.com"));
//! # Ok::<(), bypass_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bypass;
pub mod config;
pub mod error;
pub mod matcher;
pub mod reload;
pub mod rules;

// Re-exports for convenience
pub use bypass::{Bypass, Bypasser};
pub use config::Config;
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use reload::{FileReloader, ParseMode, Reloader, Stoppable};
pub use rules::RuleSet;
