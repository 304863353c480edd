//! iconforge: turn a folder of SVG icons into an icon font and typed Dart
//! `IconData` constants.
//! Fonts are built by external tools: fantasticon for monochrome fonts,
//! nanoemoji for color fonts.

pub mod color;
pub mod config;
pub mod dart;
pub mod emit;
mod error;
pub mod glyph;
pub mod input;
pub mod mono;
pub mod pipeline;
pub mod process;
pub mod sanitize;
pub mod strategy;
mod workspace;

pub use config::{Config, ToolConfig};
pub use emit::{emit, EmitRequest};
pub use error::{EmitError, Error, InputError, Result, ToolError};
pub use glyph::{FontArtifact, GlyphAssignment, GlyphMap};
pub use input::{prepare, IconKind, IconSource, PreparedInput, SkippedFile};
pub use pipeline::{check, deliver, generate, GenerationReport};
pub use process::{Invocation, ProcessOutput, ProcessRunner};
pub use sanitize::sanitize;
pub use strategy::{FontMode, FontStrategy, ReadyStrategy, ToolVersion};
pub use workspace::Workspace;

// Test utilities
pub mod test_support;
