use std::collections::HashMap;

use crate::error::Error;
use crate::error::Result;

pub(crate) const TAG_KEY_COLUMN: &str = "column";

/// Splits `key=value,key=value` field tags. Pairs without exactly one `=` are
/// rejected; unknown keys are kept and ignored by the caller.
pub(crate) fn parse_tag(tag: Option<&str>) -> Result<HashMap<String, String>> {
    let mut pairs = HashMap::new();
    let Some(tag) = tag.filter(|t| !t.is_empty()) else {
        return Ok(pairs);
    };

    for pair in tag.split(',') {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(Error::InvalidTagContent { pair: pair.to_string() }),
        }
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_column() {
        let tags = parse_tag(Some("column=first_name")).unwrap();
        assert_eq!(tags.get(TAG_KEY_COLUMN).map(String::as_str), Some("first_name"));
    }

    #[test]
    fn test_parse_tag_empty() {
        assert!(parse_tag(None).unwrap().is_empty());
        assert!(parse_tag(Some("")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tag_keeps_unknown_keys() {
        let tags = parse_tag(Some("column=id,size=11")).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["size"], "11");
    }

    #[test]
    fn test_parse_tag_empty_value() {
        let tags = parse_tag(Some("column=")).unwrap();
        assert_eq!(tags[TAG_KEY_COLUMN], "");
    }

    #[test]
    fn test_parse_tag_missing_equals() {
        let err = parse_tag(Some("column")).unwrap_err();
        assert!(matches!(err, Error::InvalidTagContent { ref pair } if pair == "column"));
    }

    #[test]
    fn test_parse_tag_too_many_equals() {
        assert!(matches!(parse_tag(Some("column=a=b")), Err(Error::InvalidTagContent { .. })));
    }
}
