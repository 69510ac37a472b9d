//! Persisted token format.
//!
//! A token is a query string: `key=value` pairs joined with `&`, both sides
//! percent-encoded. Unset values are not written, so they come back as missing keys.

use contracts::shared::filter_form::FilterMap;

const PAIR_SEPARATOR: &str = "&";

/// Serializes a filter, `None` when there is nothing to persist
pub fn encode(filter: &FilterMap) -> Option<String> {
    let token = filter
        .iter()
        .filter_map(|(key, value)| {
            value.map(|value| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
        })
        .collect::<Vec<_>>()
        .join(PAIR_SEPARATOR);

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Parses a token back into a filter.
///
/// Never fails: segments that cannot be decoded are dropped.
pub fn decode(token: Option<&str>) -> FilterMap {
    let mut filter = FilterMap::new();
    let Some(token) = token else {
        return filter;
    };

    for segment in token.split(PAIR_SEPARATOR) {
        if segment.is_empty() {
            continue;
        }

        let (raw_key, raw_value) = segment.split_once('=').unwrap_or((segment, ""));
        let (Some(key), Some(value)) = (decode_component(raw_key), decode_component(raw_value))
        else {
            tracing::debug!(segment, "Dropping undecodable filter token segment");
            continue;
        };

        if key.is_empty() {
            continue;
        }
        filter.insert(key, Some(value));
    }

    filter
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .ok()
        .map(|decoded| decoded.into_owned())
}
