use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of an event in the network.
///
/// `sentinel` is the value a builder starts from when no explicit start event
/// is given. `successor` returns a value strictly greater than its input, or
/// `None` once the identifier domain is exhausted; iterating it from a start
/// value yields the event chain.
pub trait NodeId: Copy + Ord + Hash + Debug {
    fn sentinel() -> Self;
    fn successor(self) -> Option<Self>;
}

macro_rules! impl_integer_node_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NodeId for $ty {
                fn sentinel() -> Self {
                    0
                }

                fn successor(self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

impl_integer_node_id!(u8, u16, u32, u64, usize, i32, i64);

impl NodeId for char {
    fn sentinel() -> Self {
        '0'
    }

    fn successor(self) -> Option<Self> {
        match self {
            '\u{D7FF}' => Some('\u{E000}'),
            c => char::from_u32(c as u32 + 1),
        }
    }
}
