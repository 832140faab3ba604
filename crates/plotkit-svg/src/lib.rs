//! # Plotkit SVG
//!
//! SVG parsing for the Plotkit pipeline. Converts SVG document text into
//! the shared segment model:
//!
//! - **Tokenizer**: path `d` micro-syntax to fixed-arity command records
//! - **Interpreter**: command records to local-space segments
//! - **Transform resolver**: `transform` attributes and cumulative
//!   ancestor matrices
//! - **Shape normalizer**: rect/circle/ellipse/line/polyline/polygon to
//!   segments
//! - **Document walker**: whole documents, including `<g>` nesting and
//!   `<use>`/`<symbol>` indirection
//!
//! Parsing is permissive throughout: malformed commands and unsupported
//! elements are skipped with a log line, never a hard failure, so a
//! damaged document still imports partially.

pub mod document;
pub mod interpreter;
pub mod shapes;
pub mod tokenizer;
pub mod transform;

pub use document::{ParsedSvg, parse_svg};
pub use interpreter::{CenterArc, arc_endpoint_to_center, interpret_path_data, interpret_tokens};
pub use tokenizer::{PathToken, tokenize_path};
pub use transform::{parse_transform_list, resolve_node_ctm};
