pub mod corpus;
pub mod dictionary;
