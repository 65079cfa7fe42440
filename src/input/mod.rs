mod reader;

pub use reader::{InputReader, parse_requests};
