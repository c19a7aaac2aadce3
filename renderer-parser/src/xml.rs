//! Minimal typed XML query helpers.
//!
//! Two decoding paths are offered. Documents with a fixed schema (device and
//! service descriptions) are deserialized with serde after their namespace
//! prefixes are stripped. Open-ended documents (DIDL-Lite items, `LastChange`
//! payloads) are walked as an `xmltree` tree, where element names are already
//! local names, so `dc:title` and `title` match alike.

use crate::error::{ParseError, ParseResult};
use serde::de::DeserializeOwned;
use xmltree::Element;

/// Deserialize a fixed-schema document into `T`, ignoring namespace prefixes.
pub fn deserialize<T: DeserializeOwned>(xml: &str) -> ParseResult<T> {
    let stripped = strip_namespaces(xml);
    quick_xml::de::from_str(&stripped)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

/// Parse a document into an element tree.
pub fn parse_element(xml: &str) -> ParseResult<Element> {
    Element::parse(xml.trim().as_bytes()).map_err(|e| ParseError::InvalidXmlStructure(e.to_string()))
}

/// First direct child with the given local name.
pub fn child<'a>(element: &'a Element, local_name: &str) -> Option<&'a Element> {
    element.get_child(local_name)
}

/// All direct children with the given local name, in document order.
pub fn children_named<'a>(
    element: &'a Element,
    local_name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(move |e| e.name == local_name)
}

/// Trimmed text of the first child with the given name; `None` when absent or empty.
pub fn child_text(element: &Element, local_name: &str) -> Option<String> {
    child(element, local_name)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Trimmed text content of an element (empty when it has none).
pub fn element_text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Attribute value by local name.
pub fn attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// Depth-first search for the first element (including `element` itself)
/// that satisfies `predicate`.
pub fn find_descendant<'a, F>(element: &'a Element, predicate: &F) -> Option<&'a Element>
where
    F: Fn(&Element) -> bool,
{
    if predicate(element) {
        return Some(element);
    }
    element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .find_map(|e| find_descendant(e, predicate))
}

/// Strip namespace prefixes and `xmlns` declarations from XML text.
///
/// Input: `<e:propertyset xmlns:e="urn:x"><dc:title>Song</dc:title></e:propertyset>`
/// Output: `<propertyset><title>Song</title></propertyset>`
pub fn strip_namespaces(xml: &str) -> String {
    let mut result = String::with_capacity(xml.len());
    let mut chars = xml.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            result.push(c);
            continue;
        }
        result.push(c);

        if let Some(slash) = chars.next_if_eq(&'/') {
            result.push(slash);
        }

        // Processing instructions, comments and doctypes are copied verbatim
        if matches!(chars.peek(), Some('?') | Some('!')) {
            for ch in chars.by_ref() {
                result.push(ch);
                if ch == '>' {
                    break;
                }
            }
            continue;
        }

        let mut tag_name = String::new();
        while let Some(ch) = chars.next_if(|ch| !(ch.is_whitespace() || *ch == '>' || *ch == '/')) {
            tag_name.push(ch);
        }
        result.push_str(local_part(&tag_name));

        while let Some(&ch) = chars.peek() {
            if ch == '>' {
                result.push(ch);
                chars.next();
                break;
            }
            if ch == '/' || ch.is_whitespace() {
                result.push(ch);
                chars.next();
                continue;
            }

            let mut attr_name = String::new();
            while let Some(ach) =
                chars.next_if(|ach| !(*ach == '=' || ach.is_whitespace() || *ach == '>' || *ach == '/'))
            {
                attr_name.push(ach);
            }

            let keep = !attr_name.starts_with("xmlns");
            if keep {
                result.push_str(local_part(&attr_name));
            }

            if let Some(eq) = chars.next_if_eq(&'=') {
                if keep {
                    result.push(eq);
                }
                if let Some(quote) = chars.next_if(|q| *q == '"' || *q == '\'') {
                    if keep {
                        result.push(quote);
                    }
                    for ch in chars.by_ref() {
                        if keep {
                            result.push(ch);
                        }
                        if ch == quote {
                            break;
                        }
                    }
                }
            }
        }
    }

    result
}

fn local_part(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
