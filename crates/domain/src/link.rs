//! Link-header pagination cursor parsing
//!
//! The upstream API embeds the next page's URL in a `link` header entry
//! tagged `rel="next"`. The URL is followed verbatim; it already encodes
//! the continuation cursor.

/// Extracts the `rel="next"` URL from a `link` header.
///
/// A blank header, or one without a `rel="next"` entry, yields `None`:
/// the terminal state of a pagination walk, never an error.
#[must_use]
pub fn next_page_url(link_header: &str) -> Option<String> {
    if link_header.trim().is_empty() {
        return None;
    }
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.splitn(2, ';');
        let url = parts.next()?.trim();
        let rel = parts.next()?.trim();
        (rel == r#"rel="next""#).then(|| url.trim_matches(['<', '>', ' ']).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE_TWO: &str = "https://lms.example.com/api/v1/courses?page=2&per_page=100";

    #[test]
    fn test_next_entry_extracted() {
        let header = format!(
            "<{PAGE_TWO}>; rel=\"next\", <https://lms.example.com/api/v1/courses?page=1>; rel=\"first\""
        );
        assert_eq!(next_page_url(&header), Some(PAGE_TWO.to_string()));
    }

    #[test]
    fn test_next_not_first_entry() {
        let header = format!(
            "<https://lms.example.com/api/v1/courses?page=1>; rel=\"prev\", <{PAGE_TWO}>; rel=\"next\""
        );
        assert_eq!(next_page_url(&header), Some(PAGE_TWO.to_string()));
    }

    #[test]
    fn test_no_next_entry_is_terminal() {
        let header = "<https://lms.example.com/api/v1/courses?page=1>; rel=\"first\"";
        assert_eq!(next_page_url(header), None);
    }

    #[test]
    fn test_blank_header_is_terminal() {
        assert_eq!(next_page_url(""), None);
        assert_eq!(next_page_url("   "), None);
    }

    #[test]
    fn test_malformed_header_is_terminal() {
        assert_eq!(next_page_url("not a link header"), None);
    }
}
