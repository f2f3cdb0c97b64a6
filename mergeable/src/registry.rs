//! Process-wide augmentation registry.
//!
//! A host runs the design-time pipeline once per entity type definition
//! and registers the result here; merge-time callers look augmentations
//! up by entity name.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use mergeable_synth::{AugmentationDescriptor, SynthError, TypeDescriptor, augment};

static REGISTRY: OnceLock<RwLock<HashMap<String, AugmentationDescriptor>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, AugmentationDescriptor>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

pub fn register_augmentation(augmentation: &AugmentationDescriptor) {
    registry()
        .write()
        .unwrap()
        .insert(augmentation.entity.clone(), augmentation.clone());
}

pub fn get_augmentation(entity: &str) -> Option<AugmentationDescriptor> {
    registry().read().unwrap().get(entity).cloned()
}

/// Run filter + synthesizer for a type descriptor and register the result.
pub fn augment_and_register(ty: &TypeDescriptor) -> Result<AugmentationDescriptor, SynthError> {
    let augmentation = augment(ty)?;
    register_augmentation(&augmentation);
    Ok(augmentation)
}
