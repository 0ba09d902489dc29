//! Files generated into bundles: shell templates and icons.

pub mod icons;
pub mod templates;
