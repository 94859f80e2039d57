pub mod complexity;
pub mod memo;
pub mod runner;
pub mod search;
pub mod selector;
pub mod state;
pub mod timing;

pub use crate::domain::model::{Catalogue, Item, SelectionSummary, Strategy, TimingSample};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
