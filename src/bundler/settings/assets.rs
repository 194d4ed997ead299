//! Asset catalog compiler settings.

/// Configuration for the external asset catalog compiler.
///
/// The compiler is invoked as
/// `<program> <args...> <catalog> --compile <dest> --platform <platform>
/// --minimum-deployment-target <version>`.
///
/// # Configuration
///
/// ```toml
/// [resources.asset_compiler]
/// program = "xcrun"
/// args = ["actool"]
/// minimum_deployment_target = "12.0"
/// ```
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AssetCompilerSettings {
    /// Executable to run.
    ///
    /// Default: "xcrun"
    pub program: String,

    /// Arguments placed before the catalog path.
    ///
    /// Default: `["actool"]`
    pub args: Vec<String>,

    /// Overrides the `--platform` value derived from the target platform.
    ///
    /// Default: None
    pub platform: Option<String>,

    /// Minimum deployment target passed to the compiler.
    ///
    /// Default: "9.0"
    pub minimum_deployment_target: String,
}

impl Default for AssetCompilerSettings {
    fn default() -> Self {
        Self {
            program: "xcrun".to_string(),
            args: vec!["actool".to_string()],
            platform: None,
            minimum_deployment_target: "9.0".to_string(),
        }
    }
}
