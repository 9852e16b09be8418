//! Declarative JSON-to-JSON shift transforms.
//!
//! A shift spec describes where each value of an input document lands in the
//! output document. Specs are compiled once into an immutable matcher tree
//! and can then reshape any number of documents, from any number of threads.
//!
//! # Example
//!
//! ```
//! use json_shift::ShiftSpec;
//! use serde_json::json;
//!
//! let spec = ShiftSpec::compile(&json!([{
//!     "operation": "shift",
//!     "spec": {
//!         "Student[]": {
//!             "*": {"grade": "categories[]", "count": "values[]"}
//!         }
//!     }
//! }]))
//! .unwrap();
//!
//! let input = json!({"Student[]": [
//!     {"grade": "七年级", "count": 3},
//!     {"grade": "八年级", "count": 2}
//! ]});
//!
//! assert_eq!(
//!     spec.transform(&input).unwrap(),
//!     json!({"categories": ["七年级", "八年级"], "values": [3, 2]})
//! );
//! ```
//!
//! # Spec keys
//!
//! | key           | matches                                                |
//! |---------------|--------------------------------------------------------|
//! | `grade`       | the key `grade` (or index `0` when written `0`)         |
//! | `*`           | every key / array index, captured                      |
//! | `rating-*`    | keys with that shape; each `*` is a capture group       |
//! | `grade\|age`  | either key, captured                                   |
//! | `@`           | emits the current value                                |
//! | `$`, `$2`     | emits a captured key                                   |
//! | `#text`       | emits the constant `"text"`                            |
//!
//! # Output paths
//!
//! Dot-separated keys with bracket suffixes: `a.b`, `list[]` (append),
//! `list[3]`, `[&1].name` (captured index), `by-&1.total` (captured key).
//! `&1` is the innermost capture, `&2` the one above it, and `&(N,M)` is
//! the `M`-th `*` group of capture `N`.

pub mod build;
pub mod capture;
pub mod error;
pub mod key;
pub mod node;
pub mod spec;
pub mod template;
pub mod walk;

pub use build::{build, OutputBuilder};
pub use capture::{Capture, CaptureContext};
pub use error::{CompileError, ShiftError, WalkError};
pub use key::{KeyPattern, Matcher};
pub use node::{Interior, SpecNode, VirtualLeaf};
pub use spec::{shift, Operation, ShiftSpec};
pub use template::{CaptureRef, KeyPiece, OutputTemplate, PathSegment, MAX_ARRAY_INDEX};
pub use walk::{walk, walk_into, Emission, EmissionSink};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn compiled_specs_are_shareable() {
        assert_send_sync::<ShiftSpec>();
        assert_send_sync::<Operation>();
    }

    #[test]
    fn walk_then_build_matches_apply() {
        let op = Operation::compile(&json!({"rows": {"*": {"k": "keys[]", "v": "vals.&1"}}})).unwrap();
        let input = json!({"rows": [{"k": "a", "v": 1}, {"k": "b", "v": 2}]});
        let emissions = walk(op.root(), &input).unwrap();
        let built = build(emissions).unwrap();
        assert_eq!(built, op.apply(&input).unwrap());
        assert_eq!(built, json!({"keys": ["a", "b"], "vals": {"0": 1, "1": 2}}));
    }
}
