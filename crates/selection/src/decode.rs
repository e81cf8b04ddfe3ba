//! Brace-delimited selection encoding.
//!
//! The grammar is `{"name":order,"name":order,...}` with no escaping inside
//! names. Each item is split on its first `:`, so names may not contain a
//! colon either.

use std::fmt::Write as _;

use crate::{DecodeError, SelectionMap};

/// Decodes a selection encoding into a [`SelectionMap`].
///
/// Empty input, whitespace and `{}` all decode to an empty map. Duplicate
/// names and duplicate positions are rejected.
///
/// # Errors
///
/// Returns [`DecodeError`] when the braces are missing, an item has no
/// separator, a name is unquoted or empty, or a position is not a positive
/// 32-bit integer or exceeds [`MAX_ORDER`](crate::MAX_ORDER).
pub fn decode_selection(encoded: &str) -> Result<SelectionMap, DecodeError> {
    let trimmed = encoded.trim();
    let mut map = SelectionMap::new();
    if trimmed.is_empty() {
        return Ok(map);
    }

    let body = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or(DecodeError::UnbalancedBraces)?;
    if body.trim().is_empty() {
        return Ok(map);
    }

    for raw in body.split(',') {
        let item = raw.trim();
        let (name_token, order_token) = item
            .split_once(':')
            .ok_or_else(|| DecodeError::MissingSeparator {
                item: item.to_owned(),
            })?;

        let name = unquote(name_token.trim()).ok_or_else(|| DecodeError::UnquotedName {
            item: item.to_owned(),
        })?;
        if name.is_empty() {
            return Err(DecodeError::EmptyName {
                item: item.to_owned(),
            });
        }

        let order_token = order_token.trim();
        let order = order_token
            .parse::<u32>()
            .map_err(|_| DecodeError::InvalidOrder {
                name: name.to_owned(),
                value: order_token.to_owned(),
            })?;

        map.insert(name, order)?;
    }

    tracing::debug!(target: "export::selection", entries = map.len(), "decoded selection");
    Ok(map)
}

/// Renders `map` in the selection encoding, ordered by position.
#[must_use]
pub fn encode_selection(map: &SelectionMap) -> String {
    let mut encoded = String::from("{");
    for (index, entry) in map.entries_by_order().into_iter().enumerate() {
        if index > 0 {
            encoded.push(',');
        }
        let _ = write!(encoded, "\"{}\":{}", entry.name(), entry.order());
    }
    encoded.push('}');
    encoded
}

fn unquote(token: &str) -> Option<&str> {
    token.strip_prefix('"')?.strip_suffix('"')
}
