//! # sori - character-dialogue tone shaping for GPT-SoVITS
//!
//! `sori` renders dialogue scripts into per-line audio files. Each speaker
//! has a tone profile (pitch, speed, volume), optionally refined by emotion
//! labels, and the profile is applied to a shared reference clip with a
//! deterministic resampling transform. A configured GPT-SoVITS HTTP server
//! can take over actual speech synthesis, with the shaped clip acting as
//! the per-line voice reference.
//!
//! ## Quick start
//!
//! ```no_run
//! use sori::profile::ProfileBook;
//! use sori::render::{render_script, RenderOptions};
//! use sori::script::Script;
//!
//! let script = Script::from_yaml(
//!     "- speaker: hyunjung\n  text: annyeong\n  emotion: excited\n",
//! ).unwrap();
//! let options = RenderOptions::local("reference.wav", "out");
//! let report = render_script(&script, &ProfileBook::default(), &options).unwrap();
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! ```
//!
//! ## Tone shaping
//!
//! The transform is intentionally simple: naive linear-interpolation
//! resampling for speed and (simulated) pitch, a volume multiply, and a
//! final clip to `[-1, 1]`. The pitch step changes duration along with
//! pitch; see [`audio::transform::ToneShaper::shape`]. Identical inputs
//! always produce bit-identical output.
//!
//! ## Model assets
//!
//! The pretrained weights the external server needs can be fetched with
//! [`download::fetch_asset`], which falls back across alternate hub
//! repositories when the primary one is missing a file.

pub mod audio;
pub mod config;
pub mod download;
pub mod error;
pub mod gateway;
pub mod profile;
pub mod render;
pub mod script;

pub use audio::AudioBuffer;
pub use config::{load_config, AppConfig};
pub use error::{Result, TtsError};
pub use profile::{ProfileBook, ToneProfile};
pub use render::{render_script, RenderOptions, RenderReport};
pub use script::{DialogueLine, Script};
