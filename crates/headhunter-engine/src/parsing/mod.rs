pub mod case;
pub mod patterns;
pub mod tokenizer;

pub use case::detect_text_case;
pub use patterns::{HeadingCapture, HeadingPattern};
pub use tokenizer::{Tokenizer, tokenize};
