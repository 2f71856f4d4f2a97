//! Part writer: buffers markup destined for one framed segment.

use std::fmt;

use crate::boundary::Boundary;

/// Buffers the markup of one component render ahead of framing.
///
/// A writer is created with the boundary its content will eventually be
/// framed under, so the boundary can be embedded in a client action
/// argument before any markup has been produced. This is what makes
/// deferred rendering possible: the action list references the token,
/// the payload arrives later in the same body.
#[derive(Debug)]
pub struct PartWriter {
    boundary: Boundary,
    buffer: String,
}

impl PartWriter {
    /// New writer framing its output under `boundary`.
    #[must_use]
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            buffer: String::new(),
        }
    }

    /// The boundary this writer's content will be framed under.
    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Append text to the buffered payload.
    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Append text followed by a newline.
    pub fn write_line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// True if nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish writing and produce the framed-ready content part.
    #[must_use]
    pub fn into_part(self) -> ContentPart {
        ContentPart {
            boundary: self.boundary,
            payload: self.buffer,
        }
    }
}

impl fmt::Write for PartWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

/// One renderable segment of the response body: a payload plus the
/// boundary it is framed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    /// Token the payload is framed under.
    pub boundary: Boundary,
    /// The markup itself.
    pub payload: String,
}

impl ContentPart {
    /// Render the segment with its opening and closing markers.
    #[must_use]
    pub fn frame(&self) -> String {
        frame_segment(self.boundary.as_str(), &self.payload)
    }
}

/// Wrap `payload` in the sentinel markers for `token`.
#[must_use]
pub(crate) fn frame_segment(token: &str, payload: &str) -> String {
    format!("<!--{token}-->{payload}<!--//{token}-->")
}
