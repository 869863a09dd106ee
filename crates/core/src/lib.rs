//! `excursio-core`: domain building blocks for the booking flow.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, money, the domain error model and the state machine trait the
//! booking wizard is built on.

pub mod entity;
pub mod error;
pub mod id;
pub mod machine;
pub mod text;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BookingId, ServiceId};
pub use machine::StateMachine;
pub use value_object::Money;
