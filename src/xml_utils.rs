use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Cursor;

use crate::core::EdiError;

pub type XmlResult = Result<String, EdiError>;

fn xml_io(e: std::io::Error) -> EdiError {
    EdiError::Xml(format!("XML write error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, EdiError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, EdiError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| EdiError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, EdiError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, EdiError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, EdiError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Write `<name>text</name>`. Empty text still produces both tags so
    /// mandatory elements never disappear.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, EdiError> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, EdiError> {
        self.start_element_with_attrs(name, attrs)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    /// Write a text element only when `text` is non-empty.
    pub fn optional_element(&mut self, name: &str, text: &str) -> Result<&mut Self, EdiError> {
        if !text.is_empty() {
            self.text_element(name, text)?;
        }
        Ok(self)
    }

    // An empty text event is still written: it keeps the indenting writer
    // from breaking the line between the start and end tag.
    fn write_text(&mut self, text: &str) -> Result<(), EdiError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        Ok(())
    }
}

/// Format a decimal with exactly `dp` decimal places, rounding half away
/// from zero.
pub fn format_fixed(d: Decimal, dp: u32) -> String {
    let mut rounded = d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Format a quantity without trailing zeros (`4`, `2.5`).
pub fn format_quantity(d: Decimal) -> String {
    d.normalize().to_string()
}

/// Element name of a start/empty tag as an owned string.
pub fn element_name(e: &quick_xml::events::BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Value of attribute `key`, unescaped.
pub fn attribute(e: &quick_xml::events::BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
