use quick_xml::escape::escape;

/// Prefix bound to the active schema namespace by the envelope.
pub const PREFIX: &str = "blk";

/// Builds a request fragment. Element names are written with the `blk:`
/// prefix; text and attribute values are escaped.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: String,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn finish(self) -> String {
        self.buf
    }

    pub fn start(&mut self, name: &str) -> &mut Self {
        self.start_with(name, &[])
    }

    pub fn start_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.open_tag(name, attrs);
        self.buf.push('>');
        self
    }

    pub fn end(&mut self, name: &str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(PREFIX);
        self.buf.push(':');
        self.buf.push_str(name);
        self.buf.push('>');
        self
    }

    pub fn empty(&mut self, name: &str) -> &mut Self {
        self.empty_with(name, &[])
    }

    pub fn empty_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.open_tag(name, attrs);
        self.buf.push_str("/>");
        self
    }

    /// `<blk:name>text</blk:name>`
    pub fn text(&mut self, name: &str, text: &str) -> &mut Self {
        self.text_with(name, &[], text)
    }

    pub fn text_with(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> &mut Self {
        self.start_with(name, attrs);
        self.buf.push_str(&escape(text));
        self.end(name)
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.buf.push('<');
        self.buf.push_str(PREFIX);
        self.buf.push(':');
        self.buf.push_str(name);
        for (key, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(key);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(*value));
            self.buf.push('"');
        }
    }
}
