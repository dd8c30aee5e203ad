//! Strategy domain - request classification and caching policies

mod executor;
mod selector;

pub use executor::StrategyExecutor;
pub use selector::{Strategy, select_strategy};
