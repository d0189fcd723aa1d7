//! Frame decoder - converts raw reader lines to presence events
//!
//! The reader firmware emits one JSON object per line:
//!
//! ```text
//! {"event":"READY"}
//! {"event":"TAG_ON","uid":"04A1B2C3"}
//! {"event":"TAG_OFF","uid":"04A1B2C3"}
//! ```
//!
//! Decoding is pure: no state is kept between lines and nothing blocks.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::event::{PresenceEvent, TagId};

/// Decode one line into a presence event
pub fn decode_line(line: &str) -> Result<PresenceEvent, DecodeError> {
    let value: Value =
        serde_json::from_str(line.trim()).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let frame = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let event = match frame.get("event") {
        Some(Value::String(event)) => event.as_str(),
        Some(_) => return Err(DecodeError::InvalidField("event")),
        None => return Err(DecodeError::MissingField("event")),
    };

    match event {
        "TAG_ON" => Ok(PresenceEvent::TagPresent(decode_uid(frame)?)),
        "TAG_OFF" => Ok(PresenceEvent::TagAbsent(decode_uid(frame)?)),
        "READY" => Ok(PresenceEvent::ReaderReady),
        other => Err(DecodeError::UnknownEvent(other.to_string())),
    }
}

fn decode_uid(frame: &Map<String, Value>) -> Result<TagId, DecodeError> {
    match frame.get("uid") {
        Some(Value::String(uid)) if !uid.trim().is_empty() => Ok(TagId::new(uid.as_str())),
        Some(_) => Err(DecodeError::InvalidField("uid")),
        None => Err(DecodeError::MissingField("uid")),
    }
}
