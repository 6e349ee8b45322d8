use crate::db_types::Order;

/// Emitted once per checkout session, when reconciliation moves its order to `paid`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
