//! # insucalc-core
//!
//! Core types for the InsuCalc pricing matrix: the row model, backend
//! payloads, the lookup gateway seam, progress tokens, and observers.

pub mod constants;
pub mod error;
pub mod gateway;
pub mod observer;
pub mod observers;
pub mod options;
pub mod product;
pub mod progress;
pub mod row;

// Re-exports
pub use constants::{exit_codes, DEFAULT_AGE, DEFAULT_BASE_AMOUNT, PLACEHOLDER};
pub use error::MatrixError;
pub use gateway::{LookupError, LookupGateway, TermQuery};
pub use observer::{ObserverSet, SelectionObserver};
pub use options::{GatewayOptions, SelectionDefaults};
pub use product::{PolicyTerms, ProductInfo, TermsPayload};
pub use progress::{OperationToken, ProgressUpdate, Stage};
pub use row::{Availability, CheckOutcome, PremiumOutcome, Row, RowKey, RowKind};
