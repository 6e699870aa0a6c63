pub mod main_panel;
pub mod settings_panel;

pub use main_panel::render_main_panel;
pub use settings_panel::render_settings_panel;
