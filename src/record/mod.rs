//! Record stream format
//!
//! This module covers everything between poses and text:
//! - [`schema`]: column layout resolved once per session
//! - [`encoder`]: poses to one delimited record
//! - [`decoder`]: one record back to poses, with sentinel detection
//! - [`sink`]: append-only line targets
//! - [`stream`]: loading persisted streams and naming new ones

pub mod decoder;
pub mod encoder;
pub mod schema;
pub mod sink;
pub mod stream;

pub use decoder::{DecodedFrame, DecodedSample, FrameDecoder};
pub use encoder::{encode, encode_header, PrefixValues};
pub use schema::{build_schema, game_layout, PrefixField, Schema, SchemaEntry};
pub use sink::{FileSink, MemorySink, RecordSink};
pub use stream::{output_file_name, output_path, RecordStream, SchemaCheck};
