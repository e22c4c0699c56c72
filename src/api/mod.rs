pub mod extract;
pub mod pagination;
pub mod payload;

pub use extract::{IdPath, RequestUrl};
pub use pagination::{Fetched, ListParams, ListQuery, Listing, Page, PageRequest};
pub use payload::Payload;
