//! Query pipelines on top of the stores
//!
//! - [`Debouncer`] - quiet-period evaluation where newer queries win
//! - [`KitchenSearch`] - debounced inventory search
//! - [`SuggestionEngine`] - browsing mode, ranking and ingredient transfer
//! - [`RecipeFeed`] - debounced recipe list that follows the data

mod debounce;
mod search;
mod suggest;
mod feed;

pub use debounce::{Debouncer, Evaluation, RefreshHandle, DEFAULT_QUIET_PERIOD};
pub use search::KitchenSearch;
pub use suggest::{evaluate, SuggestionEngine};
pub use feed::RecipeFeed;
