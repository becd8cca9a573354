/// Operator precedence ladder for generated C expressions, tightest first.
///
/// Every expression generator returns its text together with the `Order` of
/// its outermost operator. A caller embedding that text asks for the loosest
/// order it can accept; anything binding looser (or equally loose) gets
/// wrapped in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    Atomic,
    UnaryPostfix,
    UnaryPrefix,
    Multiplicative,
    Additive,
    Shift,
    Relational,
    Equality,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    Conditional,
    Assignment,
    None,
}

impl Order {
    pub fn level(self) -> u8 {
        match self {
            Order::Atomic => 0,
            Order::UnaryPostfix => 1,
            Order::UnaryPrefix => 2,
            Order::Multiplicative => 3,
            Order::Additive => 4,
            Order::Shift => 5,
            Order::Relational => 6,
            Order::Equality => 7,
            Order::BitwiseAnd => 8,
            Order::BitwiseXor => 9,
            Order::BitwiseOr => 10,
            Order::LogicalAnd => 11,
            Order::LogicalOr => 12,
            Order::Conditional => 13,
            Order::Assignment => 14,
            Order::None => 99,
        }
    }

    pub fn needs_parens(inner: Order, outer: Order) -> bool {
        if outer.level() > inner.level() {
            return false;
        }
        // Atoms never need wrapping and a slot taking anything never adds any.
        !(outer == inner && matches!(outer, Order::Atomic | Order::None))
    }
}

pub fn wrap(code: String, inner: Order, outer: Order) -> String {
    if Order::needs_parens(inner, outer) {
        format!("({})", code)
    } else {
        code
    }
}
