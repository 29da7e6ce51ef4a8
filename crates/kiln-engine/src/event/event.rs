use crate::input::InputEvent;
use crate::object::ObjectId;

/// Closed set of event kinds; `UserEvent` carries application-defined payloads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// Save the editor scene and switch to the play scene.
    GameEngineStartPlay,
    /// Leave the play scene and go back to the editor scene.
    GameEngineStopPlay,
    /// Persist the active scene.
    SaveLevel,
    /// Rebuild the active scene from scratch.
    LoadLevel,
    UserEvent,
    /// A platform input event drained at the top of the frame.
    Input,
    /// Result of a picking readback.
    ObjectPicked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Input(InputEvent),
    Object(Option<ObjectId>),
    Text(String),
}

/// Immutable message posted on the `EventChannel`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    payload: Option<EventPayload>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, payload: None }
    }

    pub fn with_payload(kind: EventKind, payload: EventPayload) -> Self {
        Self { kind, payload: Some(payload) }
    }

    pub fn input(ev: InputEvent) -> Self {
        Self::with_payload(EventKind::Input, EventPayload::Input(ev))
    }

    pub fn object_picked(object: Option<ObjectId>) -> Self {
        Self::with_payload(EventKind::ObjectPicked, EventPayload::Object(object))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_payload(EventKind::UserEvent, EventPayload::Text(text.into()))
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> Option<&EventPayload> {
        self.payload.as_ref()
    }
}
