pub mod confirm;
pub mod notifications;
pub mod prompt;
pub mod sidebar;
pub mod spinner;
