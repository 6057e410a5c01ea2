//! Parse HTTP response header lines into ResponseHead.

use super::ResponseHead;

/// Parse collected header lines (one response's block) into ResponseHead.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse::<u32>().ok());
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    head.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                head.content_disposition = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-type") {
                head.content_type = Some(value.to_string());
            }
        }
    }

    head
}

/// Appends a raw header line, dropping the block of any earlier (redirect) response.
pub(crate) fn push_header_line(lines: &mut Vec<String>, raw: &[u8]) {
    let Ok(s) = std::str::from_utf8(raw) else {
        return;
    };
    let line = s.trim_end();
    if line.starts_with("HTTP/") {
        lines.clear();
    }
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}
