#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
#[cfg(feature = "export")]
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{load_config, Config, LayoutConfig, RenderConfig};
#[cfg(feature = "export")]
pub use export::{ExportError, ExportFormat, Exporter};
pub use ir::{
    category_universe, normalize_companies, parse_category_field, CategoryTokens, Company, Dataset,
};
pub use layout::{compute_layout, Scene};
pub use render::render_svg;
pub use theme::{Palette, Theme};
pub use viewport::{PanDirection, Viewport};
