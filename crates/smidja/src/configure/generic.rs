//! The generic pass: every key no specialized configurator owns goes through
//! [`Node::set`].

use crate::error::AssemblyError;
use crate::node::Node;
use crate::value::Props;

/// Assign every non-reserved key. Returns one warning per rejected key.
pub fn configure(node: &mut Node, props: Props<'_>) -> Vec<AssemblyError> {
    let reserved = node.reserved_keys();
    props
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .filter_map(|(key, value)| node.set(key, value).err())
        .collect()
}
