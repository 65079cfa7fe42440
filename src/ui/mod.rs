mod progress;
mod theme;

pub use progress::LanguageProgressBars;
pub use theme::Style;
