use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding: &'static Encoding,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("page is not valid {encoding}")]
pub struct DecodeError {
    pub encoding: String,
}

/// Decode page bytes for parsing. Charset precedence: BOM, then the
/// Content-Type `charset` parameter, then byte-level detection.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedPage, DecodeError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| {
            content_type
                .and_then(charset_param)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding,
    })
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_param, decode_page};

    #[test]
    fn charset_param_is_case_insensitive_and_unquoted() {
        assert_eq!(charset_param("text/html; Charset=\"ISO-8859-1\""), Some("ISO-8859-1"));
        assert_eq!(charset_param("text/html"), None);
    }

    #[test]
    fn declared_charset_wins_over_detection() {
        let bytes = b"<p>caf\xe9</p>";
        let page = decode_page(bytes, Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(page.html, "<p>café</p>");
        assert_eq!(page.encoding.name(), "windows-1252");
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = b"\xEF\xBB\xBF<p>ok</p>";
        let page = decode_page(bytes, Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(page.encoding.name(), "UTF-8");
        assert_eq!(page.html, "<p>ok</p>");
    }

    #[test]
    fn invalid_utf8_is_rejected_when_declared() {
        let bytes = b"<p>\xff\xfe\xfd</p>";
        assert!(decode_page(bytes, Some("text/html; charset=utf-8")).is_err());
    }
}
