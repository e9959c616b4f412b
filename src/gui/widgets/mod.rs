pub mod navigation_menu;
pub mod text;

pub use text::text;
