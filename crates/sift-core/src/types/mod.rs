mod id;

pub use id::{Id, MessageId, RequestId, SessionId};
