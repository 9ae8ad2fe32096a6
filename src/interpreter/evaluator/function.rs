/// Function lookup and calls.
///
/// Resolves a call against the visible definitions, binds the arguments in a
/// fresh frame and evaluates the body, rejecting re-entry.
pub mod core;

/// Function definitions.
///
/// Registers definitions in the current frame after rejecting collisions and
/// checking, in a temporary frame, that every call in the body resolves.
pub mod validation;
