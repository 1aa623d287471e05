//! # dish-go
//!
//! Client core for a recipe suggestion service. The user photographs their
//! ingredients (or types them), the photo is shrunk and re-encoded into a
//! payload the service accepts, and the service answers with recipe cards.
//!
//! # Architecture: Two Halves
//!
//! ```text
//! 1. Imaging    photo file  →  base64 JPEG  (decode, fit, flatten, encode)
//! 2. Generator  request     →  recipes      (POST /cooking, observable state)
//! ```
//!
//! The imaging half is synchronous pixel work behind the [`imaging::ImageBackend`]
//! trait, so the pipeline logic is testable without decoding anything. The
//! generator half is async and owns the only mutable state in the crate:
//! `recipes`, `loading`, `error` and `cached` for one request cycle.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Wire types for `POST /cooking`: request, response envelope, recipes |
//! | [`imaging`] | Legacy-container detection and transcode, fit-to-box resize, JPEG normalize |
//! | [`encoding`] | Data-URL construction and base64 payload extraction |
//! | [`preview`] | Revocable preview URLs for the selected photo |
//! | [`form`] | Ingredient chips, request validation, photo selection tracking |
//! | [`generator`] | HTTP transport and the single-flight request coordinator |
//! | [`config`] | `dish-go.toml` loading, validation and the environment override |
//! | [`output`] | CLI output formatting for `prepare` and `generate` |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Upload Size Is Bounded Client-Side
//!
//! Phone photos are routinely 4000px and several megabytes. Every photo is
//! shrunk to fit 1024x1024 (never enlarged) and re-encoded as JPEG before it
//! leaves the device, so request size is predictable regardless of camera.
//!
//! ## Transparency Becomes White
//!
//! JPEG has no alpha channel. Images are composited onto opaque white before
//! encoding, so transparent regions read as a white background rather than
//! whatever the encoder would otherwise invent.
//!
//! ## Latest Request Wins
//!
//! A slow response must not overwrite the result of a request started after
//! it. [`generator::RecipeGenerator`] tags each call with a ticket and applies
//! only the latest one; [`form::ImageSelection`] does the same for photo
//! normalization.

pub mod config;
pub mod encoding;
pub mod form;
pub mod generator;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod preview;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
