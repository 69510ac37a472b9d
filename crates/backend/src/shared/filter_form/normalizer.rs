//! Default substitution and user hooks applied around the persisted token.

use contracts::shared::filter_form::{Direction, FilterMap};

/// User hook that may rewrite a filter on its way into or out of the token.
///
/// Returning `None`, or an empty map, keeps the map the hook was given.
pub type DataFilter = dyn Fn(&FilterMap, Direction) -> Option<FilterMap> + Send + Sync;

/// Normalizes submitted values before they are encoded.
///
/// Empty values fall back to the default for their key and are dropped when there is none.
pub fn prepare_for_storage(
    raw: &FilterMap,
    defaults: &FilterMap,
    hook: Option<&DataFilter>,
) -> FilterMap {
    let mut filter = FilterMap::with_capacity(raw.len());
    for (key, value) in raw.iter() {
        match value {
            Some(value) if !value.is_empty() => filter.set(key, value),
            _ => {
                if let Some(default) = defaults.get_entry(key) {
                    filter.insert(key, default.clone());
                }
            }
        }
    }

    apply_hook(filter, Direction::Outbound, hook)
}

/// Rebuilds the full set of form values from a decoded token.
///
/// Every declared field is present, in declaration order. A field without a stored value is
/// set to `None` so the form blanks it. Defaults fill whatever is still missing or unset.
pub fn prepare_for_display<I, S>(
    stored: FilterMap,
    field_names: I,
    defaults: &FilterMap,
    hook: Option<&DataFilter>,
) -> FilterMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data = FilterMap::with_capacity(stored.len());
    for name in field_names {
        let name = name.as_ref();
        let value = stored
            .get(name)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        data.insert(name, value);
    }

    for (key, value) in stored {
        if !data.contains_key(&key) {
            data.insert(key, value);
        }
    }

    for (key, value) in defaults.iter() {
        if data.get(key).is_none() {
            data.insert(key, value.map(str::to_owned));
        }
    }

    apply_hook(data, Direction::Inbound, hook)
}

fn apply_hook(filter: FilterMap, direction: Direction, hook: Option<&DataFilter>) -> FilterMap {
    let Some(hook) = hook else {
        return filter;
    };
    if filter.is_empty() {
        return filter;
    }

    match hook(&filter, direction) {
        Some(replaced) if !replaced.is_empty() => replaced,
        _ => filter,
    }
}
