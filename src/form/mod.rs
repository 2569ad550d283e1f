// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form handling: model, validation, submission pipeline

mod callbacks;
mod model;
mod submit;

pub use callbacks::{CallbackRegistry, SubmitCallback};
pub use model::{FieldValue, FormField, FormModel};
pub use submit::FormPipeline;

/// CSS class marking forms the toolkit intercepts
pub const FORM_CLASS: &str = "lcsForm";

/// Data attribute naming the registered submit callback
pub const CALLBACK_ATTRIBUTE: &str = "data-onsubmit_callback";
