// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change propagation through the configuration tree.
//!
//! Every section of the tree holds a clone of the same [`ChangeSink`]. A
//! mutation on any section calls [`ConfigNode::notify_changed`], which fires
//! the sink the store installed. Whenever a section is replaced wholesale the
//! store calls [`ConfigNode::bind`] on the root again, so the new subtree
//! shares the sink as well.

use std::fmt;
use std::rc::Rc;

/// Callback fired whenever any node of the tree reports a change.
///
/// An unbound sink is a no-op. Sinks never take part in equality, so two
/// trees holding the same data compare equal regardless of their binding.
#[derive(Clone, Default)]
pub struct ChangeSink(Option<Rc<dyn Fn()>>);

impl ChangeSink {
    /// Creates a sink that invokes `callback` on every change.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self(Some(Rc::new(callback)))
    }

    /// Fires the sink.
    pub fn notify(&self) {
        if let Some(callback) = &self.0 {
            callback();
        }
    }

    /// Returns true if a callback is installed.
    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    /// Returns true if both sinks invoke the same callback.
    pub fn same_as(&self, other: &ChangeSink) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for ChangeSink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for ChangeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSink")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A section of the configuration tree.
pub trait ConfigNode {
    /// The sink this node reports to.
    fn sink(&self) -> &ChangeSink;

    /// Mutable access to the sink slot, used by [`ConfigNode::bind`].
    fn sink_mut(&mut self) -> &mut ChangeSink;

    /// Calls `visit` once for each nested section.
    fn visit_children(&mut self, _visit: &mut dyn FnMut(&mut dyn ConfigNode)) {}

    /// Installs `sink` on this node and, recursively, on every nested section.
    fn bind(&mut self, sink: &ChangeSink) {
        *self.sink_mut() = sink.clone();
        self.visit_children(&mut |child| child.bind(sink));
    }

    /// Reports a mutation of this node.
    fn notify_changed(&self) {
        self.sink().notify();
    }
}

/// Implements [`ConfigNode`] for a section with a `sink` field, listing the
/// fields that hold nested sections.
macro_rules! config_node {
    ($ty:ty) => {
        config_node!($ty;);
    };
    ($ty:ty; $($child:ident),* $(,)?) => {
        impl $crate::node::ConfigNode for $ty {
            fn sink(&self) -> &$crate::node::ChangeSink {
                &self.sink
            }

            fn sink_mut(&mut self) -> &mut $crate::node::ChangeSink {
                &mut self.sink
            }

            #[allow(unused_variables)]
            fn visit_children(
                &mut self,
                visit: &mut dyn FnMut(&mut dyn $crate::node::ConfigNode),
            ) {
                $( visit(&mut self.$child); )*
            }
        }
    };
}

pub(crate) use config_node;

/// Returns true if `node` and every nested section report to `sink`.
pub fn is_bound_to(node: &mut dyn ConfigNode, sink: &ChangeSink) -> bool {
    let mut bound = node.sink().same_as(sink);
    node.visit_children(&mut |child| bound &= is_bound_to(child, sink));
    bound
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Default)]
    struct Leaf {
        sink: ChangeSink,
    }
    config_node!(Leaf);

    #[derive(Debug, Default)]
    struct Branch {
        left: Leaf,
        right: Leaf,
        sink: ChangeSink,
    }
    config_node!(Branch; left, right);

    #[test]
    fn bind_reaches_every_nested_node() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let sink = ChangeSink::new(move || counter.set(counter.get() + 1));

        let mut tree = Branch::default();
        assert!(!is_bound_to(&mut tree, &sink));
        tree.bind(&sink);
        assert!(is_bound_to(&mut tree, &sink));

        tree.right.notify_changed();
        tree.notify_changed();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn replaced_child_is_unbound_until_rebind() {
        let sink = ChangeSink::new(|| {});
        let mut tree = Branch::default();
        tree.bind(&sink);

        tree.left = Leaf::default();
        assert!(!is_bound_to(&mut tree, &sink));
        tree.bind(&sink);
        assert!(is_bound_to(&mut tree, &sink));
    }

    #[test]
    fn unbound_sink_is_noop() {
        let sink = ChangeSink::default();
        assert!(!sink.is_bound());
        sink.notify();
        assert_eq!(sink, ChangeSink::new(|| {}));
    }
}
