pub mod keyword;

pub use keyword::KeywordIndex;
