use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A provider-native history message that the agent carries verbatim.
///
/// The neutral message variants lose provider-specific structure: for
/// example, an OpenAI assistant turn that requested tool calls must be
/// echoed back with those tool calls intact, or the follow-up request is
/// rejected. Providers wrap such payloads in a `NativeMessage`; the agent
/// stores it in the conversation without looking inside, and the provider
/// downcasts it back when serializing the next request.
pub struct NativeMessage(Arc<dyn NativePayload>);

impl NativeMessage {
    /// Wraps a payload with an identifier.
    ///
    /// The `id` should be unique across the conversation; comparing two
    /// `NativeMessage`s compares only their ids.
    #[inline]
    pub fn new<ID: Into<String>, T: Send + Sync + 'static>(
        id: ID,
        payload: T,
    ) -> Self {
        Self(Arc::new(PayloadCell {
            id: id.into(),
            payload,
        }))
    }

    /// Attempts to borrow the payload back as its concrete type.
    ///
    /// Returns `None` when the message was created by a different
    /// provider (or with a different payload type).
    #[inline]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl Clone for NativeMessage {
    #[inline]
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl Debug for NativeMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMessage")
            .field("id", &self.0.id())
            .finish()
    }
}

impl PartialEq for NativeMessage {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl Eq for NativeMessage {}

impl Hash for NativeMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id().hash(state);
    }
}

trait NativePayload: Send + Sync {
    fn id(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

struct PayloadCell<T> {
    id: String,
    payload: T,
}

impl<T: Send + Sync + 'static> NativePayload for PayloadCell<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        &self.payload
    }
}
