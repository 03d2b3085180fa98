use crate::gate::exchange::Payload;
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::collections::BTreeMap;
use url::Url;

pub const PAYLOAD_FIELD: &str = "payload";

/// Hidden form that hands the payload to the SSO endpoint.
#[derive(Debug, Clone)]
pub struct RedirectForm {
    action: Url,
    payload: Payload,
}

impl RedirectForm {
    #[must_use]
    pub fn new(action: Url, payload: Payload) -> Self {
        Self { action, payload }
    }

    #[must_use]
    pub fn action(&self) -> &Url {
        &self.action
    }

    #[must_use]
    pub fn method(&self) -> &'static str {
        "POST"
    }

    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 1] {
        [(PAYLOAD_FIELD, self.payload.expose())]
    }

    /// Render a page that submits the form as soon as it loads.
    ///
    /// The payload ends up in the markup, the page must not be cached.
    #[must_use]
    pub fn to_html(&self) -> String {
        let inputs: String = self
            .fields()
            .iter()
            .map(|(name, value)| {
                format!(
                    r#"<input type="hidden" name="{}" value="{}">"#,
                    escape_attribute(name),
                    escape_attribute(value)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Redirecting</title></head>
<body onload="document.forms[0].submit()">
<form method="{method}" action="{action}">{inputs}<noscript><button type="submit">Continue</button></noscript></form>
</body>
</html>
"#,
            method = self.method(),
            action = escape_attribute(self.action.as_str()),
        )
    }
}

impl Serialize for RedirectForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RedirectForm", 3)?;
        state.serialize_field("action", self.action.as_str())?;
        state.serialize_field("method", self.method())?;
        state.serialize_field("fields", &BTreeMap::from(self.fields()))?;
        state.end()
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
