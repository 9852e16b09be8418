//! Service surface for json-shift: request/response envelopes and the logic
//! behind the `json-shift` command-line tool.
//!
//! ```
//! use json_shift_cli::request::handle_json;
//!
//! let response = handle_json(r#"{
//!     "preset": "gender",
//!     "data": {"Student[]": [{"gender": "男", "count": 6}]}
//! }"#);
//! assert!(response.success);
//! assert_eq!(response.output.unwrap()[0]["value"], 6);
//! ```

pub mod commands;
pub mod request;

pub use commands::CliError;
pub use request::{handle, handle_json, info, self_check, Request, RequestError, Response};
