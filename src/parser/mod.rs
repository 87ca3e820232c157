pub mod machine;
pub mod satellites;
pub mod sentences;
pub mod source;
pub mod tokenizer;

pub use machine::*;
pub use satellites::*;
pub use sentences::*;
pub use source::*;
pub use tokenizer::*;
