//! TwiML replies for the SMS webhook.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A messaging response: either one reply message or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Twiml(Option<String>);

impl Twiml {
    pub fn message(text: impl Into<String>) -> Self {
        Self(Some(text.into()))
    }

    /// Acknowledge without sending a reply.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn render(&self) -> String {
        match &self.0 {
            Some(text) => format!(
                "{XML_DECL}<Response><Message>{}</Message></Response>",
                escape(text)
            ),
            None => format!("{XML_DECL}<Response/>"),
        }
    }
}

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, "application/xml")], self.render()).into_response()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message() {
        assert_eq!(
            Twiml::message("Message received :^)").render(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>Message received :^)</Message></Response>"#
        );
    }

    #[test]
    fn escapes_markup() {
        let rendered = Twiml::message(r#"<b>"Tom" & 'Jerry'</b>"#).render();
        assert!(rendered.contains(
            "<Message>&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;</Message>"
        ));
    }

    #[test]
    fn empty_response() {
        assert!(Twiml::empty().render().ends_with("<Response/>"));
    }
}
