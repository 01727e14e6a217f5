//! Read XML text into an owned [`Element`] tree.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::utils::validation::MAX_XML_DEPTH;
use crate::xml::{Element, XmlError};

/// Parse an XML document into its root element.
///
/// Names are reduced to their local part, namespace declarations are
/// dropped, and each element's direct text is concatenated and trimmed.
/// Comments, processing instructions and the DOCTYPE are ignored.
///
/// # Errors
///
/// Returns `XmlError::Syntax` for malformed input, `XmlError::Unclosed` if
/// the document ends inside an element, `XmlError::MultipleRoots` for
/// trailing top-level elements, `XmlError::Empty` if there is no root, or
/// `XmlError::TooDeep` once nesting passes [`MAX_XML_DEPTH`].
pub fn parse_str(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(ref e) => {
                check_depth(stack.len())?;
                stack.push(start_to_element(e, reader.buffer_position())?);
            }
            Event::Empty(ref e) => {
                check_depth(stack.len())?;
                let element = start_to_element(e, reader.buffer_position())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                if let Some(mut element) = stack.pop() {
                    element.text = element.text.trim().to_string();
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Event::CData(ref c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::GeneralRef(ref r) => {
                if let Some(current) = stack.last_mut() {
                    let name = String::from_utf8_lossy(r).to_string();
                    let resolved = match r.resolve_char_ref() {
                        Ok(Some(ch)) => ch.to_string(),
                        _ => resolve_predefined_entity(&name)
                            .map_or_else(|| format!("&{name};"), str::to_string),
                    };
                    current.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::Empty)
}

/// Fail when one more open element would pass [`MAX_XML_DEPTH`]
fn check_depth(open: usize) -> Result<(), XmlError> {
    if open >= MAX_XML_DEPTH {
        return Err(XmlError::TooDeep(MAX_XML_DEPTH));
    }
    Ok(())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::MultipleRoots),
    }
    Ok(())
}

fn start_to_element(start: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax {
            position,
            message: e.to_string(),
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value).to_string();
        let value = unescape(&raw)
            .map_err(|e| XmlError::Syntax {
                position,
                message: e.to_string(),
            })?
            .to_string();
        element.set_attr(key, value);
    }

    Ok(element)
}
