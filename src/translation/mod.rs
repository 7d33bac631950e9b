/*!
 * Translation services for subtitle content.
 *
 * This module provides the translation boundary of the application:
 * - `core`: the TranslationService that talks to a provider per batch
 * - `batch`: the sequential batch loop with progress reporting and
 *   per-batch failure recovery
 */

pub mod core;
pub mod batch;

pub use core::TranslationService;
pub use batch::{BatchTranslator, TranslationSummary};
