//! Text fields of a buffered `multipart/form-data` body.

use memchr::memmem;

/// Extracts the non-file fields of a multipart body.
///
/// Parts that carry a `filename` are uploads, not form fields, and are
/// skipped, as are parts whose content is not valid UTF-8. Parsing stops at
/// the closing delimiter or at the first malformed part.
pub(crate) fn text_fields(body: &[u8], boundary: &str) -> Vec<(String, String)> {
    let delimiter = format!("--{boundary}");
    let separator = format!("\r\n--{boundary}");
    let mut fields = Vec::new();

    let Some(start) = memmem::find(body, delimiter.as_bytes()) else {
        return fields;
    };
    let mut rest = &body[start + delimiter.len()..];

    loop {
        if rest.starts_with(b"--") {
            break;
        }
        let Some(line_end) = memmem::find(rest, b"\r\n") else {
            break;
        };
        let part = &rest[line_end + 2..];

        let Some(headers_end) = memmem::find(part, b"\r\n\r\n") else {
            break;
        };
        let headers = &part[..headers_end];
        let content = &part[headers_end + 4..];

        let Some(content_end) = memmem::find(content, separator.as_bytes()) else {
            break;
        };

        if let Some(name) = field_name(headers) {
            match std::str::from_utf8(&content[..content_end]) {
                Ok(value) => fields.push((name, value.to_string())),
                Err(_) => tracing::debug!(field = %name, "skipping non-UTF-8 multipart field"),
            }
        }

        rest = &content[content_end + separator.len()..];
    }

    fields
}

/// `name` from the part's `Content-Disposition`, or `None` for file parts.
fn field_name(headers: &[u8]) -> Option<String> {
    let headers = std::str::from_utf8(headers).ok()?;

    let disposition = headers.split("\r\n").find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("content-disposition")
            .then_some(value)
    })?;

    let mut name = None;
    for param in disposition.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(value.to_string()),
            "filename" | "filename*" => return None,
            _ => {}
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----FormBoundary7MA4YWxk";

    fn body(parts: &[&str]) -> Vec<u8> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n{part}\r\n"));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body.into_bytes()
    }

    #[test]
    fn text_fields_are_extracted() {
        let body = body(&[
            "Content-Disposition: form-data; name=\"csrf_token\"\r\n\r\nabc123",
            "Content-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\nworld",
        ]);

        let fields = text_fields(&body, BOUNDARY);
        assert_eq!(
            fields,
            vec![
                ("csrf_token".to_string(), "abc123".to_string()),
                ("title".to_string(), "hello\r\nworld".to_string()),
            ]
        );
    }

    #[test]
    fn file_parts_are_skipped() {
        let body = body(&[
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\nfile body",
            "Content-Disposition: form-data; name=\"csrf_token\"\r\n\r\nabc123",
        ]);

        let fields = text_fields(&body, BOUNDARY);
        assert_eq!(fields, vec![("csrf_token".to_string(), "abc123".to_string())]);
    }

    #[test]
    fn empty_value_is_kept() {
        let body = body(&["Content-Disposition: form-data; name=\"csrf_token\"\r\n\r\n"]);
        assert_eq!(
            text_fields(&body, BOUNDARY),
            vec![("csrf_token".to_string(), String::new())]
        );
    }

    #[test]
    fn truncated_body_yields_complete_parts_only() {
        let mut body = body(&["Content-Disposition: form-data; name=\"a\"\r\n\r\n1"]);
        body.truncate(body.len() - 4);
        body.extend_from_slice(b"\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\n2");

        assert_eq!(text_fields(&body, BOUNDARY), vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn wrong_boundary_yields_nothing() {
        let body = body(&["Content-Disposition: form-data; name=\"a\"\r\n\r\n1"]);
        assert!(text_fields(&body, "other").is_empty());
    }
}
