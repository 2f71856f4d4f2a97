//! Response body assembly and parsing.
//!
//! An [`Envelope`] collects framed content parts and named channel
//! segments and renders them into one body. [`ParsedEnvelope`] is the
//! client half: it scans a body for marker pairs, indexes every segment
//! by token, and decodes the action channel with part references
//! resolved.

use indexmap::IndexMap;
use serde_json::Value;

use crate::boundary::Channel;
use crate::error::WireError;
use crate::writer::{frame_segment, ContentPart};

/// Collects the segments of one response body ahead of rendering.
///
/// Ordering across segments carries no meaning to the client (it
/// indexes by token), but parts are emitted before channels so that
/// every boundary referenced from the action channel is physically
/// present by the time the action list is parsed.
#[derive(Debug, Default)]
pub struct Envelope {
    parts: Vec<ContentPart>,
    channels: IndexMap<Channel, String>,
}

impl Envelope {
    /// Empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a framed content part.
    ///
    /// Fails if a part with the same boundary was already added; a
    /// boundary must locate exactly one segment.
    pub fn push_part(&mut self, part: ContentPart) -> Result<(), WireError> {
        if self
            .parts
            .iter()
            .any(|existing| existing.boundary == part.boundary)
        {
            return Err(WireError::DuplicateBoundary {
                token: part.boundary.as_str().to_owned(),
            });
        }
        self.parts.push(part);
        Ok(())
    }

    /// Write a named channel segment. Each channel may be written once.
    pub fn set_channel(&mut self, channel: Channel, payload: String) -> Result<(), WireError> {
        if self.channels.contains_key(&channel) {
            return Err(WireError::ChannelAlreadySet {
                channel: channel.name(),
            });
        }
        self.channels.insert(channel, payload);
        Ok(())
    }

    /// True if a channel has been written.
    #[must_use]
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Render the single response body.
    ///
    /// Never produces an empty body: some HTTP clients treat a
    /// zero-length body as a transport failure, so an otherwise empty
    /// envelope renders as a single space.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let mut body = String::new();
        for part in &self.parts {
            body.push_str(&part.frame());
        }
        for (channel, payload) in &self.channels {
            body.push_str(&frame_segment(channel.name(), payload));
        }
        if body.is_empty() {
            body.push(' ');
        }
        body.into_bytes()
    }
}

/// One client action decoded from the action channel, with any part
/// reference resolved to the payload framed under the matching token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAction {
    /// Browser-side function name.
    pub function: String,
    /// Resolved arguments.
    pub args: Vec<Value>,
}

/// A response body parsed back into its segments.
///
/// Segments are indexed by token in body order. Channel segments are
/// recognized by their reserved names; every other segment is a content
/// part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnvelope {
    segments: IndexMap<String, String>,
}

impl ParsedEnvelope {
    /// Scan `body` for marker-delimited segments.
    ///
    /// Bytes outside any segment (such as the mandatory single space of
    /// an otherwise empty body) are ignored. A payload may itself
    /// contain unrelated comment markup; only the exact closing marker
    /// of the currently open token terminates a segment.
    pub fn parse(body: &str) -> Result<Self, WireError> {
        let mut segments = IndexMap::new();
        let mut rest = body;
        while let Some(open) = rest.find("<!--") {
            let after_open = &rest[open + 4..];
            let Some(token_end) = after_open.find("-->") else {
                break;
            };
            let token = &after_open[..token_end];
            let payload_and_rest = &after_open[token_end + 3..];
            let closing = format!("<!--//{token}-->");
            let Some(close) = payload_and_rest.find(&closing) else {
                return Err(WireError::UnterminatedSegment {
                    token: token.to_owned(),
                });
            };
            let payload = &payload_and_rest[..close];
            if segments
                .insert(token.to_owned(), payload.to_owned())
                .is_some()
            {
                return Err(WireError::DuplicateBoundary {
                    token: token.to_owned(),
                });
            }
            rest = &payload_and_rest[close + closing.len()..];
        }
        Ok(Self { segments })
    }

    /// Number of segments found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if the body carried no segments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Payload of a reserved channel, if present.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> Option<&str> {
        self.segments.get(channel.name()).map(String::as_str)
    }

    /// Payload of a content part by its boundary token.
    #[must_use]
    pub fn part(&self, token: &str) -> Option<&str> {
        if Channel::is_reserved(token) {
            return None;
        }
        self.segments.get(token).map(String::as_str)
    }

    /// Tokens of all content parts, in body order.
    pub fn content_tokens(&self) -> impl Iterator<Item = &str> {
        self.segments
            .keys()
            .map(String::as_str)
            .filter(|token| !Channel::is_reserved(token))
    }

    /// Decode the action channel into an ordered action list.
    ///
    /// Any string argument that matches a content token verbatim is a
    /// part reference and is replaced by that part's payload. Absence
    /// of the action channel decodes as an empty list.
    pub fn decode_actions(&self) -> Result<Vec<DecodedAction>, WireError> {
        let Some(raw) = self.channel(Channel::Action) else {
            return Ok(Vec::new());
        };
        let value: Value = serde_json::from_str(raw)?;
        let Value::Array(entries) = value else {
            return Err(WireError::MalformedActionList {
                reason: "top level is not an array".to_owned(),
            });
        };
        let mut actions = Vec::with_capacity(entries.len());
        for entry in entries {
            let Value::Array(pair) = entry else {
                return Err(WireError::MalformedActionList {
                    reason: "entry is not a [function, args] pair".to_owned(),
                });
            };
            let [Value::String(function), Value::Array(raw_args)] = pair.as_slice() else {
                return Err(WireError::MalformedActionList {
                    reason: "entry is not a [function, args] pair".to_owned(),
                });
            };
            let args = raw_args.iter().map(|arg| self.resolve_arg(arg)).collect();
            actions.push(DecodedAction {
                function: function.clone(),
                args,
            });
        }
        Ok(actions)
    }

    fn resolve_arg(&self, arg: &Value) -> Value {
        if let Value::String(text) = arg {
            if let Some(payload) = self.part(text) {
                return Value::String(payload.to_owned());
            }
        }
        arg.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionQueue, Content};
    use crate::boundary::BoundaryAllocator;
    use crate::writer::PartWriter;
    use assert_matches::assert_matches;

    fn body_str(envelope: &Envelope) -> String {
        String::from_utf8(envelope.render()).expect("body is utf-8")
    }

    #[test]
    fn empty_envelope_still_emits_one_byte() {
        let envelope = Envelope::new();
        let body = envelope.render();
        assert!(!body.is_empty());
        assert_eq!(body, b" ");
    }

    #[test]
    fn duplicate_part_boundary_is_rejected() {
        let mut alloc = BoundaryAllocator::new();
        let boundary = alloc.allocate();
        let mut envelope = Envelope::new();
        envelope
            .push_part(PartWriter::new(boundary.clone()).into_part())
            .expect("first part accepted");
        let err = envelope
            .push_part(PartWriter::new(boundary).into_part())
            .unwrap_err();
        assert_matches!(err, WireError::DuplicateBoundary { .. });
    }

    #[test]
    fn channel_cannot_be_written_twice() {
        let mut envelope = Envelope::new();
        envelope
            .set_channel(Channel::Redirect, "/login".into())
            .expect("first write accepted");
        let err = envelope
            .set_channel(Channel::Redirect, "/other".into())
            .unwrap_err();
        assert_matches!(err, WireError::ChannelAlreadySet { channel } if channel == "redirect-channel");
    }

    #[test]
    fn parse_indexes_segments_by_token_not_position() {
        let mut envelope = Envelope::new();
        envelope
            .set_channel(Channel::Data, "{\"n\":1}".into())
            .expect("data channel");
        envelope
            .set_channel(Channel::State, "opaque-token".into())
            .expect("state channel");
        let parsed = ParsedEnvelope::parse(&body_str(&envelope)).expect("parses");
        assert_eq!(parsed.channel(Channel::State), Some("opaque-token"));
        assert_eq!(parsed.channel(Channel::Data), Some("{\"n\":1}"));
        assert_eq!(parsed.channel(Channel::Fault), None);
    }

    #[test]
    fn payload_containing_comment_markup_is_preserved() {
        let mut alloc = BoundaryAllocator::new();
        let mut writer = PartWriter::new(alloc.allocate());
        writer.write("<div><!-- inner comment --></div>");
        let mut envelope = Envelope::new();
        envelope.push_part(writer.into_part()).expect("part accepted");
        let parsed = ParsedEnvelope::parse(&body_str(&envelope)).expect("parses");
        assert_eq!(
            parsed.part("part-0000"),
            Some("<div><!-- inner comment --></div>")
        );
    }

    #[test]
    fn unterminated_segment_is_an_error() {
        let err = ParsedEnvelope::parse("<!--part-0000--><div>never closed").unwrap_err();
        assert_matches!(err, WireError::UnterminatedSegment { token } if token == "part-0000");
    }

    #[test]
    fn decode_resolves_part_references_verbatim() {
        let mut alloc = BoundaryAllocator::new();
        let boundary = alloc.allocate();
        let mut writer = PartWriter::new(boundary.clone());
        writer.write("<span>fragment</span>");

        let mut queue = ActionQueue::new();
        queue.replace_content("pane", Content::Part(boundary));
        queue.hide("spinner");

        let mut envelope = Envelope::new();
        envelope.push_part(writer.into_part()).expect("part accepted");
        envelope
            .set_channel(Channel::Action, queue.encode().to_string())
            .expect("action channel");

        let parsed = ParsedEnvelope::parse(&body_str(&envelope)).expect("parses");
        let actions = parsed.decode_actions().expect("decodes");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].function, "Element.replace");
        assert_eq!(actions[0].args[2], Value::Null);
        assert_eq!(
            actions[0].args[3],
            Value::String("<span>fragment</span>".into())
        );
        assert_eq!(actions[1].function, "Element.hide");
    }

    #[test]
    fn missing_action_channel_decodes_to_no_actions() {
        let parsed = ParsedEnvelope::parse(" ").expect("parses");
        assert!(parsed.is_empty());
        assert_eq!(parsed.decode_actions().expect("decodes"), Vec::new());
    }
}
