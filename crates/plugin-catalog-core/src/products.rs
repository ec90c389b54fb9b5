//! IDE product naming
//!
//! nixpkgs names IDEs by package ("idea-ultimate"), the marketplace by
//! product code ("IDEA"). This table converts between them.

/// Upstream product that is not an IDE and has no plugin support
pub const GATEWAY_PRODUCT: &str = "gateway";

/// `(nixpkgs name, marketplace code)` pairs
pub const PRODUCTS: &[(&str, &str)] = &[
    ("clion", "CLION"),
    ("datagrip", "DBE"),
    ("goland", "GOLAND"),
    ("idea-community", "IDEA_COMMUNITY"),
    ("idea-ultimate", "IDEA"),
    ("mps", "MPS"),
    ("phpstorm", "PHPSTORM"),
    ("pycharm-community", "PYCHARM_COMMUNITY"),
    ("pycharm-professional", "PYCHARM"),
    ("rider", "RIDER"),
    ("ruby-mine", "RUBYMINE"),
    ("webstorm", "WEBSTORM"),
    ("rust-rover", "RUST"),
];

/// nixpkgs IDE name for a marketplace product code
pub fn friendly_name(code: &str) -> Option<&'static str> {
    PRODUCTS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Convert marketplace codes to sorted nixpkgs names, dropping unknown codes
pub fn friendly_names<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    let mut names: Vec<String> = codes
        .iter()
        .filter_map(|c| friendly_name(c.as_ref()))
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}
