/// Router Module Index
///
/// Splits the routing surface by access level so the gate is applied at the
/// module boundary, not per handler.

/// Routes accessible to all clients: login exchange and read-only data.
pub mod public;

/// Routes protected by the `CurrentUser` gate layer. All mutations.
pub mod authenticated;
