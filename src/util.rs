/// Stack growth for deep recursion.
///
/// Parsing nested blocks, validating nested definitions and evaluating nested
/// scopes all recurse on the shape of the program. This module provides the
/// guard that grows the stack on demand so deep programs do not overflow it.
pub mod stack;
