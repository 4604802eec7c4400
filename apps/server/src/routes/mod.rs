pub mod bookmarks;
pub mod corpus;
pub mod plan;
pub mod stats;
pub mod study;
pub mod words;
