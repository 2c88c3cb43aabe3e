pub mod core;
pub mod lifecycle;
pub mod registry;

pub use core::params::{
    CrossChainCalculationOptions, EncodeTransactionOptions, GasCalculation, OnChainCalculationOptions,
};
pub use core::rate_validator::{RateBounds, RateTolerance, RateVerdict, validate_rate};
pub use core::trade::{CrossChainTrade, GasFeeInfo, OnChainTrade};
pub use core::traits::{CalculationResult, CrossChainProvider, OnChainProvider, ProviderDeps, RouteLookup};
pub use lifecycle::{CallbackContext, CallbackRef, NoopCallback, TransactionLifecycleCallback};
pub use registry::{ProviderConfig, ProviderRegistry};
