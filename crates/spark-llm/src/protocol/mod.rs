//! Spark wire protocol: JSON request/response frames and the streamed
//! answer accumulator.

mod accumulator;
mod frames;

pub use accumulator::{AnswerAccumulator, StreamProgress};
pub use frames::{
    ChatParameter, Choices, Parameter, RequestFrame, RequestHeader, RequestMessage,
    RequestPayload, ResponseFrame, ResponseHeader, ResponsePayload, TextChunk, TokenUsage, Usage,
    STATUS_FINAL, STATUS_FIRST,
};
