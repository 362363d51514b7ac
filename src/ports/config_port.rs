//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// All key/value pairs of a section, keys as written in the file.
    fn get_section(&self, section: &str) -> Vec<(String, String)>;
}
