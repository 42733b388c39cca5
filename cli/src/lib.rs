//! Library surface of the band-image tool, exposed so integration tests
//! can drive the pipeline directly.

pub mod pipeline;
