//! Locator - selecting elements from a flattened tree

use crate::element::Element;
use crate::selector::MatchCriteria;

/// Empty strings count as "not given", like an absent field.
fn given(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Whether one element passes every filter in `criteria` (index aside).
pub fn matches(element: &Element, criteria: &MatchCriteria) -> bool {
    if !element.enabled {
        return false;
    }

    if let Some(kind) = given(&criteria.element_type) {
        if element.kind.as_str() != kind {
            return false;
        }
    }

    if let Some(id) = given(&criteria.identifier) {
        if element.identifier.as_deref() != Some(id) {
            return false;
        }
    }

    if let Some(text) = given(&criteria.text) {
        if criteria.fuzzy {
            if !element
                .haystack()
                .to_lowercase()
                .contains(&text.to_lowercase())
            {
                return false;
            }
        } else if element.label.as_deref() != Some(text) && element.value.as_deref() != Some(text) {
            return false;
        }
    }

    true
}

/// All matches in document order.
pub fn find_all<'a>(elements: &'a [Element], criteria: &MatchCriteria) -> Vec<&'a Element> {
    elements.iter().filter(|e| matches(e, criteria)).collect()
}

/// The `criteria.index`-th match in document order, if there is one.
pub fn find<'a>(elements: &'a [Element], criteria: &MatchCriteria) -> Option<&'a Element> {
    elements
        .iter()
        .filter(|e| matches(e, criteria))
        .nth(criteria.index)
}

/// Enabled elements whose kind is tappable, in document order.
pub fn tappable(elements: &[Element]) -> Vec<&Element> {
    elements
        .iter()
        .filter(|e| e.enabled && e.kind.is_tappable())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, Frame};

    fn button(label: &str) -> Element {
        Element::new(ElementKind::Button, Frame::new(0.0, 0.0, 10.0, 10.0)).with_label(label)
    }

    #[test]
    fn fuzzy_and_exact_text() {
        let elements = vec![button("Log In")];

        let fuzzy = find(&elements, &MatchCriteria::text("log"));
        assert_eq!(fuzzy.map(|e| e.label.as_deref()), Some(Some("Log In")));

        assert!(find(&elements, &MatchCriteria::exact("log")).is_none());
        assert!(find(&elements, &MatchCriteria::exact("Log In")).is_some());
    }

    #[test]
    fn exact_text_checks_value_too() {
        let field = Element::new(ElementKind::TextField, Frame::default())
            .with_label("Email")
            .with_value("me@example.com");
        let elements = vec![field];
        assert!(find(&elements, &MatchCriteria::exact("me@example.com")).is_some());
        // exact does not look at the joined haystack
        assert!(find(&elements, &MatchCriteria::exact("Email me@example.com")).is_none());
        // fuzzy does, including across the joining space
        assert!(find(&elements, &MatchCriteria::text("il me@")).is_some());
    }

    #[test]
    fn index_selects_in_document_order() {
        let elements = vec![button("A"), button("B"), button("C")];
        let criteria = MatchCriteria::element_type("Button").at(1);
        assert_eq!(
            find(&elements, &criteria).and_then(|e| e.label.as_deref()),
            Some("B")
        );
        assert!(find(&elements, &criteria.clone().at(5)).is_none());
    }

    #[test]
    fn disabled_elements_never_match() {
        let elements = vec![button("Pay").disabled(), button("Pay")];
        let found = find_all(&elements, &MatchCriteria::exact("Pay"));
        assert_eq!(found.len(), 1);
        assert!(found[0].enabled);
        assert!(find(&elements, &MatchCriteria::exact("Pay").at(1)).is_none());
        assert!(find(&elements[..1], &MatchCriteria::new()).is_none());
    }

    #[test]
    fn type_and_identifier_are_exact() {
        let elements = vec![
            button("Go").with_identifier("goButton"),
            Element::new(ElementKind::Other("Custom".into()), Frame::default()),
        ];
        assert!(find(&elements, &MatchCriteria::element_type("button")).is_none());
        assert!(find(&elements, &MatchCriteria::element_type("Custom")).is_some());
        assert!(find(&elements, &MatchCriteria::identifier("goButto")).is_none());
        assert!(find(&elements, &MatchCriteria::identifier("goButton")).is_some());
    }

    #[test]
    fn empty_criteria_picks_first_enabled() {
        let elements = vec![button("x").disabled(), button("y")];
        assert_eq!(
            find(&elements, &MatchCriteria::new()).and_then(|e| e.label.as_deref()),
            Some("y")
        );
        assert!(find(&[], &MatchCriteria::new()).is_none());
    }

    #[test]
    fn tappable_filters_kind_and_enabled() {
        let elements = vec![
            button("a"),
            button("b").disabled(),
            Element::new(ElementKind::StaticText, Frame::default()),
            Element::new(ElementKind::SecureTextField, Frame::default()),
        ];
        let kinds: Vec<_> = tappable(&elements).iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![ElementKind::Button, ElementKind::SecureTextField]);
    }
}
