// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form submission pipeline
//!
//! Validation runs first; only a fully valid form builds its data map.
//! The map then goes to the form's named callback (when registered) and
//! out on the hook bus, globally and scoped to the form ID.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::callbacks::CallbackRegistry;
use super::model::FormModel;
use crate::error::Result;
use crate::hooks::{names, HookRegistry};

/// Drives form submissions through validation, callback, and hooks
#[derive(Clone, Default)]
pub struct FormPipeline {
    callbacks: CallbackRegistry,
    hooks: Arc<HookRegistry>,
}

impl FormPipeline {
    /// Create a pipeline with its own registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline broadcasting on a shared hook registry
    pub fn with_hooks(hooks: Arc<HookRegistry>) -> Self {
        Self {
            callbacks: CallbackRegistry::new(),
            hooks,
        }
    }

    /// The submit-callback registry
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// The hook registry submissions broadcast on
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Submit a form
    ///
    /// Fails with a validation error naming every missing required
    /// field. On success returns the built data map after dispatching
    /// it to the named callback and the submission hooks.
    pub fn submit(&self, form: &FormModel) -> Result<Map<String, Value>> {
        form.validate()?;
        let (data, files) = form.build_data()?;

        tracing::info!(
            form = %form.id,
            fields = data.len(),
            files = files.len(),
            "Form submitted"
        );

        if let Some(name) = &form.on_submit_callback {
            match self.callbacks.get(name) {
                Some(callback) => callback(&data),
                None => {
                    tracing::warn!(form = %form.id, callback = %name, "Submit callback not registered");
                }
            }
        }

        let args = [Value::Object(data.clone())];
        self.hooks.fire(names::FORM_SUBMITTED, &args);
        if !form.id.is_empty() {
            self.hooks
                .fire(&names::scoped(names::FORM_SUBMITTED, &form.id), &args);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::form::model::FormField;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_invalid_form_fires_nothing() {
        let pipeline = FormPipeline::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        pipeline.hooks.add(
            names::FORM_SUBMITTED,
            Arc::new(move |_| {
                fired2.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let form = FormModel::new("f").field(FormField::text("name", "").required(true));
        assert!(matches!(
            pipeline.submit(&form),
            Err(Error::Validation { .. })
        ));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_and_hooks_receive_data() {
        let pipeline = FormPipeline::new();
        let callback_saw = Arc::new(Mutex::new(None));
        let callback_saw2 = callback_saw.clone();
        pipeline.callbacks.register(
            "onProfileSave",
            Arc::new(move |data| {
                *callback_saw2.lock() = data.get("name").cloned();
            }),
        );

        let global = Arc::new(AtomicUsize::new(0));
        let scoped = Arc::new(AtomicUsize::new(0));
        let global2 = global.clone();
        let scoped2 = scoped.clone();
        pipeline.hooks.add(
            names::FORM_SUBMITTED,
            Arc::new(move |_| {
                global2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        pipeline.hooks.add(
            "formSubmitted_profile",
            Arc::new(move |_| {
                scoped2.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let form = FormModel::new("profile")
            .callback("onProfileSave")
            .field(FormField::text("name", "Rapu").required(true));

        let data = pipeline.submit(&form).unwrap();
        assert_eq!(data.get("name"), Some(&json!("Rapu")));
        assert_eq!(*callback_saw.lock(), Some(json!("Rapu")));
        assert_eq!(global.load(Ordering::SeqCst), 1);
        assert_eq!(scoped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_callback_is_not_an_error() {
        let pipeline = FormPipeline::new();
        let form = FormModel::new("f")
            .callback("missing")
            .field(FormField::text("a", "1"));

        assert!(pipeline.submit(&form).is_ok());
    }
}
