mod settings;

pub use settings::{Command, Config, DemoSettings, Settings, TrackerSettings, WebSettings};
