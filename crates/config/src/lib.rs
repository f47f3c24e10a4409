// Configuration loading

pub mod settings;

pub use settings::{InputModeSetting, Settings, WeekdayLabelSet};
