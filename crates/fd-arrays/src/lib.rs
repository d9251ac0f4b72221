#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/arrays/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod adjusted;
pub mod adjustment;
pub mod element;
pub mod error;
pub mod factorize;
pub mod rank;
pub mod window;

// Re-export core types
pub use adjusted::AdjustedArray;
pub use adjustment::{Adjustment, AdjustmentKind};
pub use element::{Element, LabelCode};
pub use error::{ArrayError, Result};
pub use factorize::Factorizer;
pub use rank::{RankEngine, RankMethod};
pub use window::Window;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
