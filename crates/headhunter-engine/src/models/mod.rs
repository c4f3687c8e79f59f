pub mod heading;
pub mod token;

pub use heading::{ExtractionPosition, HeadingMetadata, Marker, TextCase};
pub use token::{Token, TokenKind};
