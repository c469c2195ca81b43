pub mod book;
pub mod completion;
pub mod plan;
