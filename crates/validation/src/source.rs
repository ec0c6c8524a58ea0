use value::{ConstValue, Name};

/// What a source node holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<N> {
    Null,
    Leaf(ConstValue),
    List(Vec<N>),
    /// An object; `typename` names its concrete type when known.
    Object { typename: Option<Name> },
}

/// Supplies values for a validated selection, walked field by field.
pub trait Source {
    type Node: Clone;

    /// The value of `field` on the root type `root_type`.
    fn root(&self, root_type: &str, field: &str) -> Option<Self::Node>;

    /// The value of `field` on an object node.
    fn child(&self, node: &Self::Node, field: &str) -> Option<Self::Node>;

    fn shape(&self, node: &Self::Node) -> Shape<Self::Node>;
}
