mod pace;
pub use pace::PaceParser;
