pub mod address;
pub mod etl;
pub mod path;
pub mod pipeline;
pub mod plan;
pub mod sanitize;
pub mod transform;
pub mod validator;
pub mod value;

pub use crate::domain::model::{Document, MappingRunResult, Rejection};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
