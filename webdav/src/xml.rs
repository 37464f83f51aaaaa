// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for `WebDAV` processing.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::WebDavError;

/// XML namespaces used in `WebDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";
}

/// Returns `true` if a resolved name is bound to the `DAV:` namespace.
pub fn is_dav(resolved: &ResolveResult<'_>) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == ns::DAV.as_bytes())
}

/// Appends the character data carried by a text, CDATA or entity event.
///
/// Other events are ignored.
///
/// # Errors
///
/// Returns an error if the text is not valid in the document encoding or
/// refers to an unknown entity.
pub fn push_text(event: &Event<'_>, out: &mut String) -> Result<(), WebDavError> {
    match event {
        Event::Text(text) => {
            let text = text.decode().map_err(|e| WebDavError::Xml(e.to_string()))?;
            out.push_str(&text);
        }
        Event::CData(data) => {
            let data = data.decode().map_err(|e| WebDavError::Xml(e.to_string()))?;
            out.push_str(&data);
        }
        Event::GeneralRef(reference) => {
            if let Some(ch) = reference
                .resolve_char_ref()
                .map_err(|e| WebDavError::Xml(e.to_string()))?
            {
                out.push(ch);
                return Ok(());
            }
            let name = reference
                .decode()
                .map_err(|e| WebDavError::Xml(e.to_string()))?;
            let resolved = resolve_predefined_entity(&name)
                .ok_or_else(|| WebDavError::Xml(format!("unknown entity &{name};")))?;
            out.push_str(resolved);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use quick_xml::Reader;

    use super::*;

    fn text_of(xml: &str) -> Result<String, WebDavError> {
        let mut reader = Reader::from_str(xml);
        let mut out = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => return Ok(out),
                Ok(event) => push_text(&event, &mut out)?,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[test]
    fn joins_text_entities_and_cdata() {
        let text = text_of("<a>todo &amp; ideas &#x41;&lt;<![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(text, "todo & ideas A<<raw>");
    }

    #[test]
    fn rejects_unknown_entities() {
        let err = text_of("<a>&nbsp;</a>").unwrap_err();
        assert!(matches!(err, WebDavError::Xml(_)));
    }
}
