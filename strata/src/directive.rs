//! Reserved keys interpreted by the engine instead of being treated as data.
//!
//! These strings are user-facing syntax and must be reproduced exactly.

/// Declares the parent layer of a file (path string, or `false` for none).
pub const PARENT: &str = "$parent";
/// Selects the session documents a patch applies to.
pub const MATCH: &str = "$match";
/// Alters merge behaviour; `replace` is the only accepted value.
pub const PATCH: &str = "$patch";
/// Deep-merges a referenced subtree under the current node.
pub const MERGE: &str = "$merge";
/// Substitutes the current node with a referenced subtree.
pub const REPLACE: &str = "$replace";
/// `false` omits a node, `true` selects it as an output document.
pub const OUTPUT: &str = "$output";
/// Serialises a node into a string in the named format.
pub const ENCODE: &str = "$encode";

/// Marker for a value that must be supplied by a later layer.
pub const REQUIRED: &str = "$required";

/// The only value `$patch` accepts.
pub const PATCH_REPLACE: &str = "replace";

/// Compact string form of `$merge`.
pub const MERGE_PREFIX: &str = "$merge:";
/// Compact string form of `$replace`.
pub const REPLACE_PREFIX: &str = "$replace:";

/// Deepest nesting accepted by merge, processing and diff.
pub const MAX_DEPTH: usize = 1000;

/// Keys stripped before output; any survivor fails validation.
pub const OUTPUT_DIRECTIVES: [&str; 7] = [PARENT, MATCH, PATCH, MERGE, REPLACE, OUTPUT, ENCODE];
