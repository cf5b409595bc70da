pub mod extract;
pub mod pagination;

pub use extract::{JsonBody, PathId, QueryParams};
pub use pagination::{Page, PageRequest, Pagination};
