// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::FeedError;

use super::text::{cdata_sections, xml_safe};

/// Thin layer over the quick-xml writer used by both feed formats
///
/// Text and attribute values are escaped by quick-xml (`& < > " '`); this
/// wrapper additionally drops characters XML 1.0 cannot carry.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, FeedError> {
        let mut inner = Writer::new_with_indent(Vec::new(), b' ', 2);
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(Self { inner })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedError> {
        let safe: Vec<(&str, String)> = attrs.iter().map(|&(k, v)| (k, xml_safe(v))).collect();
        let element =
            BytesStart::new(name).with_attributes(safe.iter().map(|(k, v)| (*k, v.as_str())));
        self.inner.write_event(Event::Start(element))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<(), FeedError> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedError> {
        let safe: Vec<(&str, String)> = attrs.iter().map(|&(k, v)| (k, xml_safe(v))).collect();
        let element =
            BytesStart::new(name).with_attributes(safe.iter().map(|(k, v)| (*k, v.as_str())));
        self.inner.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// `<name attrs>text</name>`
    pub fn text_element_with(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), FeedError> {
        self.start(name, attrs)?;
        self.inner
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.end(name)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), FeedError> {
        self.text_element_with(name, &[], text)
    }

    /// Write the element only when a value is present
    pub fn optional_element(&mut self, name: &str, text: Option<&str>) -> Result<(), FeedError> {
        match text {
            Some(text) => self.text_element(name, text),
            None => Ok(()),
        }
    }

    /// `<name><![CDATA[text]]></name>`, splitting sections around `]]>`
    pub fn cdata_element(&mut self, name: &str, text: &str) -> Result<(), FeedError> {
        self.start(name, &[])?;
        for section in cdata_sections(&xml_safe(text)) {
            self.inner
                .write_event(Event::CData(BytesCData::new(section.as_str())))?;
        }
        self.end(name)
    }

    pub fn finish(self) -> Result<String, FeedError> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_reserved_characters_in_text() {
        let mut writer = XmlWriter::new().unwrap();
        writer.text_element("title", "a & b < c > d \" e ' f").unwrap();
        let xml = writer.finish().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<title>a &amp; b &lt; c &gt; d &quot; e &apos; f</title>"));
    }

    #[test]
    fn escapes_attribute_values() {
        let mut writer = XmlWriter::new().unwrap();
        writer
            .empty("enclosure", &[("url", "https://x.example/a?b=1&c=\"2\"")])
            .unwrap();
        let xml = writer.finish().unwrap();

        assert!(xml.contains("url=\"https://x.example/a?b=1&amp;c=&quot;2&quot;\""));
    }

    #[test]
    fn cdata_keeps_markup_verbatim() {
        let mut writer = XmlWriter::new().unwrap();
        writer.cdata_element("content:encoded", "<p>Hi & bye</p>").unwrap();
        let xml = writer.finish().unwrap();

        assert!(xml.contains("<content:encoded><![CDATA[<p>Hi & bye</p>]]></content:encoded>"));
    }

    #[test]
    fn optional_element_skips_missing_values() {
        let mut writer = XmlWriter::new().unwrap();
        writer.optional_element("itunes:season", None).unwrap();
        let xml = writer.finish().unwrap();

        assert!(!xml.contains("itunes:season"));
    }
}
