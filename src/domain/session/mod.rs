//! The session aggregate: the durable unit of a mentoring conversation.

mod aggregate;
mod references;

pub use aggregate::MentorSession;
pub use references::{ReferenceMetadata, RetrievedReference};
