// private sub-module defined in other files
mod stream_sequence;

// exports identifiers from private sub-modules in the current module namespace
pub use self::stream_sequence::calculate_stream_sequence;
