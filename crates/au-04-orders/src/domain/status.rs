//! Order status machine

use shared_types::OrderStatus;

/// Statuses reachable from `from`.
pub fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[Paid, Failed, Cancelled],
        // A late success after a failed attempt is still a payment.
        Failed => &[Paid, Cancelled],
        Paid => &[Processing, Shipped, Cancelled, Refunded],
        Processing => &[Shipped, Cancelled, Refunded],
        Shipped => &[Delivered, Refunded],
        Delivered => &[Refunded],
        Cancelled | Refunded => &[],
    }
}

/// Whether `from -> to` is in the transition table. Same-state is never allowed.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}
