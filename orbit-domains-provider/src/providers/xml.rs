//! Minimal XML field extraction.
//!
//! Route53 and Namecheap answer in XML. The adapters only ever need a handful
//! of scalar fields and repeated element blocks out of each response, so this
//! module extracts them by scanning rather than pulling in a full XML parser.
//! Vendor responses are machine-generated and well-formed; entity decoding is
//! limited to the five predefined entities.

/// Extract the text content of the first `<tag>...</tag>` occurrence.
pub(crate) fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let start = xml.find(&open)?;
    let after_open = &xml[start..];
    let gt = after_open.find('>')?;
    // Self-closing tag has no text content
    if after_open[..gt].ends_with('/') {
        return None;
    }
    let content_start = start + gt + 1;
    let end = xml[content_start..].find(&close)?;
    Some(unescape(&xml[content_start..content_start + end]))
}

/// Extract an attribute value from the first occurrence of `<tag ...>`.
pub(crate) fn extract_attr(fragment: &str, attr: &str) -> Option<String> {
    let needle = format!("{attr}=\"");
    let start = fragment.find(&needle)?;
    let val_start = start + needle.len();
    let end = fragment[val_start..].find('"')?;
    Some(unescape(&fragment[val_start..val_start + end]))
}

/// Collect every `<tag>...</tag>` block (including the delimiting tags).
///
/// Used for repeated elements such as `<ResourceRecordSet>` or `<Domain>`.
pub(crate) fn tag_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut blocks = Vec::new();
    let mut search_from = 0;

    while let Some(start) = xml[search_from..].find(&open) {
        let abs_start = search_from + start;
        // Require an element boundary after the tag name (">" or whitespace)
        let after_name = abs_start + open.len();
        match xml.as_bytes().get(after_name) {
            Some(b'>' | b' ' | b'\t' | b'\n' | b'/') => {}
            _ => {
                search_from = after_name;
                continue;
            }
        }
        if let Some(end) = xml[abs_start..].find(&close) {
            let abs_end = abs_start + end + close.len();
            blocks.push(&xml[abs_start..abs_end]);
            search_from = abs_end;
        } else {
            break;
        }
    }

    blocks
}

/// Decode the five predefined XML entities.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Encode the five predefined XML entities for request bodies.
pub(crate) fn escape(s: &str) -> String {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return s.to_string();
    }
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_tag() {
        let xml = "<Response><Name>example.com</Name></Response>";
        assert_eq!(extract_tag(xml, "Name").unwrap(), "example.com");
    }

    #[test]
    fn extract_tag_with_attributes() {
        let xml = r#"<Zone id="z1"><Id>/hostedzone/Z123</Id></Zone>"#;
        assert_eq!(extract_tag(xml, "Id").unwrap(), "/hostedzone/Z123");
    }

    #[test]
    fn extract_missing_tag() {
        assert!(extract_tag("<A>x</A>", "B").is_none());
    }

    #[test]
    fn extract_self_closing_tag() {
        assert!(extract_tag("<A><B/></A>", "B").is_none());
    }

    #[test]
    fn extract_tag_unescapes_entities() {
        let xml = "<Message>rate &amp; quota exceeded</Message>";
        assert_eq!(
            extract_tag(xml, "Message").unwrap(),
            "rate & quota exceeded"
        );
    }

    #[test]
    fn extract_attr_value() {
        let fragment = r#"<Domain Name="example.com" IsLocked="true"/>"#;
        assert_eq!(extract_attr(fragment, "Name").unwrap(), "example.com");
        assert_eq!(extract_attr(fragment, "IsLocked").unwrap(), "true");
    }

    #[test]
    fn extract_attr_missing() {
        assert!(extract_attr(r#"<Domain Name="x"/>"#, "Expires").is_none());
    }

    #[test]
    fn tag_blocks_collects_repeats() {
        let xml = "<List><Item><V>1</V></Item><Item><V>2</V></Item></List>";
        let blocks = tag_blocks(xml, "Item");
        assert_eq!(blocks.len(), 2);
        assert_eq!(extract_tag(blocks[0], "V").unwrap(), "1");
        assert_eq!(extract_tag(blocks[1], "V").unwrap(), "2");
    }

    #[test]
    fn tag_blocks_ignores_prefix_collisions() {
        // "Item" must not match "ItemSet"
        let xml = "<ItemSet><X>0</X></ItemSet><Item><X>1</X></Item>";
        let blocks = tag_blocks(xml, "Item");
        assert_eq!(blocks.len(), 1);
        assert_eq!(extract_tag(blocks[0], "X").unwrap(), "1");
    }

    #[test]
    fn escape_roundtrip() {
        let raw = r#"a<b & "c'd">"#;
        let escaped = escape(raw);
        assert!(!escaped.contains('<'));
        assert_eq!(unescape(&escaped), raw);
    }
}
