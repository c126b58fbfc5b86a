//! Application layer orchestrating credential resolution around the ports.
//!
//! `CredentialRouter` resolves and persists per-order credentials, `CheckoutService`
//! drives payment initiation and status callbacks, and `CredentialSlot` confines
//! the shared "active credentials" hand-off to one outbound call at a time.

pub mod checkout;
pub mod router;
pub mod slot;
