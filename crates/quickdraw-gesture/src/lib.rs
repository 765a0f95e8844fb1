//! Gesture pipeline: turns the pose stream into an aim point and debounced
//! trigger pulls, and hands the result to the frame loop.

pub mod cell;
pub mod recognizer;

pub use cell::{GestureCell, GestureRead, GestureSnapshot};
pub use recognizer::{GestureOutput, GestureRecognizer, GestureState, RecognizerConfig};
