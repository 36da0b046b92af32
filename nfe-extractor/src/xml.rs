//! Local-name navigation over a roxmltree document

use roxmltree::Node;
use rust_decimal::Decimal;

use crate::decimal::parse_decimal;

/// First element child whose local name is `name`
pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Every element child whose local name is `name`
pub(crate) fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// First element, self included, in document order with local name `name`
pub(crate) fn find_first<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// First element child, whatever its name
pub(crate) fn first_element<'a, 'i>(node: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.is_element())
}

/// Trimmed text of a child, empty when absent
pub(crate) fn text(node: Node, name: &str) -> String {
    child(node, name)
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Trimmed text of the first present child among `names`
pub(crate) fn text_any(node: Node, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| child(node, name))
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Decimal value of a child
pub(crate) fn decimal(node: Node, name: &str) -> Option<Decimal> {
    child(node, name).and_then(|n| n.text()).and_then(parse_decimal)
}

pub(crate) fn only_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
