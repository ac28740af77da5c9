use crate::{types::Error, Result};

/// Cuts an inbound byte stream into complete top-level XML elements.
///
/// The protocol carries one element per logical message with no
/// prologue and no document root, so a plain XML parser cannot be
/// pointed at the stream directly. The framer tracks tag nesting
/// (honoring quoted attribute values) and hands back the exact byte
/// span of each element as it completes; full parsing happens
/// afterwards, one element at a time. Stray text between elements is
/// discarded.
pub struct Framer {
    buf: Vec<u8>,
    pos: usize,
    depth: usize,
    in_tag: bool,
    quote: Option<u8>,
    tag_start: usize,
    element_start: Option<usize>,
}

impl Framer {
    pub fn new() -> Framer {
        Framer {
            buf: Vec::new(),
            pos: 0,
            depth: 0,
            in_tag: false,
            quote: None,
            tag_start: 0,
            element_start: None,
        }
    }

    /// Appends raw bytes read from the transport.
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Returns the text of the next complete top-level element, or
    /// `None` until more bytes arrive.
    pub fn next_element(&mut self) -> Result<Option<String>> {
        while self.pos < self.buf.len() {
            let b = self.buf[self.pos];

            if !self.in_tag {
                if b == b'<' {
                    self.in_tag = true;
                    self.quote = None;
                    self.tag_start = self.pos;

                    if self.depth == 0 && self.element_start.is_none() {
                        self.element_start = Some(self.pos);
                    }
                }
                self.pos += 1;
                continue;
            }

            // Inside a tag. A '>' inside a quoted attribute value
            // does not terminate it.

            if let Some(q) = self.quote {
                if b == q {
                    self.quote = None;
                }
                self.pos += 1;
                continue;
            }

            if b == b'"' || b == b'\'' {
                self.quote = Some(b);
                self.pos += 1;
                continue;
            }

            if b != b'>' {
                self.pos += 1;
                continue;
            }

            self.in_tag = false;

            let tag = &self.buf[self.tag_start..=self.pos];

            if tag.starts_with(b"</") {
                if self.depth == 0 {
                    return Err(Error::ParseError(String::from(
                        "unbalanced closing tag",
                    )));
                }
                self.depth -= 1;
            } else if tag.starts_with(b"<?") || tag.starts_with(b"<!") {
                // Prologue or comment. At the top level it is not
                // part of any message; drop it.

                if self.depth == 0 {
                    self.element_start = None;
                    self.buf.drain(..=self.pos);
                    self.pos = 0;
                    continue;
                }
            } else if !tag.ends_with(b"/>") {
                self.depth += 1;
            }

            if self.depth == 0 {
                if let Some(start) = self.element_start.take() {
                    let end = self.pos + 1;
                    let text = String::from_utf8(self.buf[start..end].to_vec())
                        .map_err(|_| {
                            Error::ParseError(String::from(
                                "element is not valid UTF-8",
                            ))
                        })?;

                    self.buf.drain(..end);
                    self.pos = 0;

                    return Ok(Some(text));
                }
            }

            self.pos += 1;
        }

        // Everything scanned so far was inter-element junk; don't let
        // it accumulate.

        if !self.in_tag && self.element_start.is_none() {
            self.buf.clear();
            self.pos = 0;
        }

        Ok(None)
    }
}

impl Default for Framer {
    fn default() -> Self {
        Framer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(f: &mut Framer) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(e) = f.next_element().unwrap() {
            out.push(e)
        }
        out
    }

    #[test]
    fn test_single_element() {
        let mut f = Framer::new();

        f.feed(b"<getProperties version=\"1.7\"/>");
        assert_eq!(drain(&mut f), ["<getProperties version=\"1.7\"/>"]);
        assert_eq!(drain(&mut f), Vec::<String>::new());
    }

    #[test]
    fn test_element_split_across_feeds() {
        let mut f = Framer::new();

        f.feed(b"<newTextVector device=\"Cam\" name=\"X\"><oneTe");
        assert_eq!(f.next_element().unwrap(), None);

        f.feed(b"xt name=\"A\">hi</oneText></newTextVe");
        assert_eq!(f.next_element().unwrap(), None);

        f.feed(b"ctor>\n");

        let e = f.next_element().unwrap().unwrap();

        assert!(e.starts_with("<newTextVector"));
        assert!(e.ends_with("</newTextVector>"));
    }

    #[test]
    fn test_two_elements_in_one_feed() {
        let mut f = Framer::new();

        f.feed(b"<a x=\"1\"/>\n<b>body</b>\n");
        assert_eq!(drain(&mut f), ["<a x=\"1\"/>", "<b>body</b>"]);
    }

    #[test]
    fn test_quoted_angle_bracket() {
        let mut f = Framer::new();

        f.feed(b"<message message=\"a > b\"/>");
        assert_eq!(drain(&mut f), ["<message message=\"a > b\"/>"]);
    }

    #[test]
    fn test_junk_and_prologue_are_skipped() {
        let mut f = Framer::new();

        f.feed(b"  stray\n<?xml version=\"1.0\"?>\n<ping uid=\"1\"/>");
        assert_eq!(drain(&mut f), ["<ping uid=\"1\"/>"]);
    }

    #[test]
    fn test_unbalanced_close_is_an_error() {
        let mut f = Framer::new();

        f.feed(b"</oops>");
        assert!(f.next_element().is_err());
    }

    #[test]
    fn test_nested_same_name() {
        let mut f = Framer::new();

        f.feed(b"<a><a>x</a></a>");
        assert_eq!(drain(&mut f), ["<a><a>x</a></a>"]);
    }
}
