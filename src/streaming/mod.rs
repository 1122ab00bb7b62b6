pub mod decoder;
pub mod extractor;

pub use decoder::{
    DecodeErrorPolicy, DecodedEvent, DecoderOptions, EventSink, IncompleteTrailingData,
    StreamDecoder, StreamSummary,
};
pub use extractor::{ExtractedObject, ObjectScanner, ScanMode, extract_one};
