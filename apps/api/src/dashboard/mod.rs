// Dashboard: saved-resume listing, stats, import, and the template gallery.

pub mod handlers;
pub mod stats;
