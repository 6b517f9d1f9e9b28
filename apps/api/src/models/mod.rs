pub mod customization;
pub mod record;
pub mod resume;
pub mod template;
