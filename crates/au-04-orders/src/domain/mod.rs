//! Domain module for the Orders subsystem

pub mod number;
pub mod order;
pub mod status;

pub use number::{generate_order_number, is_valid_order_number, ORDER_NUMBER_PREFIX};
pub use order::{
    NewOrder, Order, OrderQuery, PaymentDetails, StatusUpdate, TransitionContext, MAX_NOTE_LEN,
};
pub use status::{allowed_targets, can_transition};
