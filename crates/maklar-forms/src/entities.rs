//! Controllers for the built-in entities.

use crate::controller::FormController;
use maklar_messages::ErrorFormatter;
use maklar_schema::{contact, property, RefinementPolicy, SchemaError};
use std::sync::Arc;

/// Contact create form; fields follow the `typ` discriminant.
pub fn contact_create(formatter: ErrorFormatter) -> Result<FormController, SchemaError> {
    Ok(FormController::new(Arc::new(contact::create_schema()?), formatter))
}

/// Contact edit form.
pub fn contact_update(formatter: ErrorFormatter) -> FormController {
    FormController::new(Arc::new(contact::update_schema()), formatter)
}

/// Property create form.
pub fn property_create(formatter: ErrorFormatter, policy: &RefinementPolicy) -> FormController {
    FormController::new(Arc::new(property::create_schema(policy)), formatter)
}

/// Property edit form.
pub fn property_update(formatter: ErrorFormatter, policy: &RefinementPolicy) -> FormController {
    FormController::new(Arc::new(property::update_schema(policy)), formatter)
}
