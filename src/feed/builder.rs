//! Built-in object-to-XML markup builder.

use quick_xml::escape::escape;
use serde_json::Value;

use super::MarkupError;

/// Options for the built-in [`XmlBuilder`].
///
/// The key conventions follow the original feed format: object keys carrying
/// the attribute prefix become attributes of the enclosing element, the text
/// node key becomes element text, and the CDATA key is emitted unescaped
/// inside a `<![CDATA[...]]>` section.
#[derive(Debug, Clone)]
pub struct XmlBuilderOptions {
    /// Prefix marking object keys that render as attributes
    pub attribute_name_prefix: String,
    /// Key whose scalar value becomes the element's text content
    pub text_node_name: String,
    /// Render attribute-prefixed keys as ordinary child elements instead
    pub ignore_attributes: bool,
    /// Key whose string value is wrapped in a CDATA section
    pub cdata_prop_name: String,
    /// Pretty-print with one element per line
    pub format: bool,
    /// Indentation unit used when pretty-printing
    pub indent_by: String,
}

impl Default for XmlBuilderOptions {
    fn default() -> Self {
        Self {
            attribute_name_prefix: "@_".into(),
            text_node_name: "#text".into(),
            ignore_attributes: false,
            cdata_prop_name: "__cdata".into(),
            format: true,
            indent_by: "  ".into(),
        }
    }
}

impl XmlBuilderOptions {
    /// Set the attribute name prefix.
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_name_prefix = prefix.into();
        self
    }

    /// Set the text node key name.
    pub fn with_text_node_name(mut self, name: impl Into<String>) -> Self {
        self.text_node_name = name.into();
        self
    }

    /// Set whether attribute-prefixed keys render as child elements.
    pub fn with_ignore_attributes(mut self, ignore: bool) -> Self {
        self.ignore_attributes = ignore;
        self
    }

    /// Set the CDATA key name.
    pub fn with_cdata_prop_name(mut self, name: impl Into<String>) -> Self {
        self.cdata_prop_name = name.into();
        self
    }

    /// Enable or disable pretty-printing.
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }
}

/// Renders `serde_json::Value` objects as XML markup fragments.
#[derive(Debug, Clone, Default)]
pub struct XmlBuilder {
    options: XmlBuilderOptions,
}

impl XmlBuilder {
    /// Create a builder with the given options.
    pub fn new(options: XmlBuilderOptions) -> Self {
        Self { options }
    }

    /// Get the builder options.
    pub fn options(&self) -> &XmlBuilderOptions {
        &self.options
    }

    /// Render a value to markup.
    ///
    /// The value must be an object; each top-level key becomes one element.
    /// When pretty-printing, the output ends with a newline.
    pub fn build(&self, value: &Value) -> Result<String, MarkupError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(MarkupError::Unrepresentable(format!(
                    "top-level value must be an object, got {}",
                    kind_name(other)
                )));
            }
        };

        let mut out = String::new();
        for (name, child) in map {
            self.build_element(&mut out, name, child, 0)?;
        }
        Ok(out)
    }

    fn build_element(
        &self,
        out: &mut String,
        name: &str,
        value: &Value,
        depth: usize,
    ) -> Result<(), MarkupError> {
        match value {
            // Arrays repeat the element name per item
            Value::Array(items) => {
                for item in items {
                    self.build_element(out, name, item, depth)?;
                }
                Ok(())
            }
            Value::Object(map) => self.build_object(out, name, map, depth),
            Value::Null => {
                self.open_line(out, depth);
                out.push('<');
                out.push_str(name);
                out.push_str("/>");
                self.close_line(out);
                Ok(())
            }
            scalar => {
                self.open_line(out, depth);
                out.push('<');
                out.push_str(name);
                out.push('>');
                out.push_str(&escape(scalar_text(scalar).as_ref()));
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                self.close_line(out);
                Ok(())
            }
        }
    }

    fn build_object(
        &self,
        out: &mut String,
        name: &str,
        map: &serde_json::Map<String, Value>,
        depth: usize,
    ) -> Result<(), MarkupError> {
        let opts = &self.options;

        let mut attributes: Vec<(&str, &Value)> = Vec::new();
        let mut text: Option<&Value> = None;
        let mut cdata: Option<&Value> = None;
        let mut children: Vec<(&str, &Value)> = Vec::new();

        for (key, value) in map {
            if !opts.ignore_attributes
                && !opts.attribute_name_prefix.is_empty()
                && let Some(attr) = key.strip_prefix(&opts.attribute_name_prefix)
            {
                attributes.push((attr, value));
            } else if *key == opts.text_node_name {
                text = Some(value);
            } else if *key == opts.cdata_prop_name {
                cdata = Some(value);
            } else {
                children.push((key, value));
            }
        }

        self.open_line(out, depth);
        out.push('<');
        out.push_str(name);
        for (attr, value) in attributes {
            let attr_text = match value {
                Value::Null => String::new(),
                scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
                    scalar_text(scalar).into_owned()
                }
                other => {
                    return Err(MarkupError::Unrepresentable(format!(
                        "attribute '{}' must be a scalar, got {}",
                        attr,
                        kind_name(other)
                    )));
                }
            };
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape(&attr_text));
            out.push('"');
        }

        if text.is_none() && cdata.is_none() && children.is_empty() {
            out.push_str("/>");
            self.close_line(out);
            return Ok(());
        }

        // Text- or CDATA-only elements stay on one line
        if children.is_empty() {
            out.push('>');
            self.push_inline_content(out, text, cdata)?;
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            self.close_line(out);
            return Ok(());
        }

        out.push('>');
        self.close_line(out);
        if text.is_some() || cdata.is_some() {
            self.open_line(out, depth + 1);
            self.push_inline_content(out, text, cdata)?;
            self.close_line(out);
        }
        for (child_name, child) in children {
            self.build_element(out, child_name, child, depth + 1)?;
        }
        self.open_line(out, depth);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
        self.close_line(out);
        Ok(())
    }

    fn push_inline_content(
        &self,
        out: &mut String,
        text: Option<&Value>,
        cdata: Option<&Value>,
    ) -> Result<(), MarkupError> {
        if let Some(value) = text {
            match value {
                Value::Null => {}
                scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
                    out.push_str(&escape(scalar_text(scalar).as_ref()));
                }
                other => {
                    return Err(MarkupError::Unrepresentable(format!(
                        "text node must be a scalar, got {}",
                        kind_name(other)
                    )));
                }
            }
        }
        if let Some(value) = cdata {
            let raw = match value {
                Value::String(s) => s.as_str(),
                other => {
                    return Err(MarkupError::Unrepresentable(format!(
                        "CDATA content must be a string, got {}",
                        kind_name(other)
                    )));
                }
            };
            out.push_str("<![CDATA[");
            out.push_str(raw);
            out.push_str("]]>");
        }
        Ok(())
    }

    fn open_line(&self, out: &mut String, depth: usize) {
        if self.options.format {
            for _ in 0..depth {
                out.push_str(&self.options.indent_by);
            }
        }
    }

    fn close_line(&self, out: &mut String) {
        if self.options.format {
            out.push('\n');
        }
    }
}

fn scalar_text(value: &Value) -> std::borrow::Cow<'_, str> {
    match value {
        Value::String(s) => std::borrow::Cow::Borrowed(s.as_str()),
        other => std::borrow::Cow::Owned(other.to_string()),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
