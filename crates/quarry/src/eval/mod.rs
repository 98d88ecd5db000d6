// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy pipeline evaluation
//!
//! Filters are chained with `flat_map`: each filter is applied to every node
//! the previous one yields, on demand. An error from any step is passed
//! through unchanged and the caller's [`Selection`](crate::Selection) stops
//! after reporting it.

mod compare;
mod query;
mod scan;
mod step;

use std::iter;

use serde_json::Value;

use crate::error::Result;
use crate::filter::PathFilter;
use crate::settings::Settings;

use self::step::Step;

/// Boxed node stream borrowing the path for `'p` and the document for `'a`.
pub(crate) type Nodes<'p, 'a> = Box<dyn Iterator<Item = Result<&'a Value>> + 'p>;

/// Apply `filters` to `current` in order.
///
/// `root` is what [`PathFilter::Root`] resolves to; for top-level paths it
/// is the same node as `current`.
pub(crate) fn evaluate<'p, 'a: 'p>(
    filters: &'p [PathFilter],
    root: &'a Value,
    current: &'a Value,
    settings: Settings,
) -> Nodes<'p, 'a> {
    let start: Nodes<'p, 'a> = Box::new(iter::once(Ok(current)));
    filters.iter().fold(start, |nodes, filter| {
        Box::new(nodes.flat_map(move |node| match node {
            Ok(node) => filter.execute(root, node, settings),
            Err(err) => Step::fail(err),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_empty_pipeline_yields_current() {
        let doc = json!({"a": 1});
        let nodes: Vec<_> = evaluate(&[], &doc, &doc, Settings::default())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes, vec![&doc]);
    }

    #[test]
    fn test_filters_chain() {
        let doc = json!({"a": [{"b": 1}, {"b": 2}, {"c": 3}]});
        let filters = [
            PathFilter::Field(Some("a".into())),
            PathFilter::Index(None),
            PathFilter::Field(Some("b".into())),
        ];
        let nodes: Vec<_> = evaluate(&filters, &doc, &doc, Settings::default())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes, vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_error_passes_through_later_steps() {
        let doc = json!({"a": 1});
        let filters = [
            PathFilter::Field(Some("missing".into())),
            PathFilter::Index(None),
            PathFilter::Scan(None),
        ];
        let mut nodes = evaluate(&filters, &doc, &doc, Settings::strict());
        assert!(matches!(
            nodes.next(),
            Some(Err(Error::PropertyNotFound { name })) if name == "missing"
        ));
    }

    #[test]
    fn test_lazy_first_node() {
        // only the first element is ever inspected
        let doc = json!([{"a": 1}, 5]);
        let filters = [PathFilter::Index(None), PathFilter::Field(Some("a".into()))];
        let mut nodes = evaluate(&filters, &doc, &doc, Settings::strict());
        assert_eq!(nodes.next().unwrap().unwrap(), &json!(1));
        assert!(nodes.next().unwrap().is_err());
    }
}
