//! Loadable bundle layout and Info.plist handling.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inputs that identify a bundle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BundleSpec {
    /// Bundle directory name without the `.bundle` extension (the library's unique name).
    pub bundle_name: String,
    /// CFBundleIdentifier, unique per logical module.
    pub identifier: String,
    /// CFBundleDevelopmentRegion locale code.
    pub development_region: String,
}

/// Identifying values read back from a bundle's Info.plist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BundleDescriptor {
    /// CFBundleIdentifier
    pub identifier: String,
    /// CFBundleName
    pub name: String,
    /// CFBundleDevelopmentRegion
    pub development_region: String,
}

/// A bundle written to disk.
#[derive(Clone, Debug)]
pub struct ResourceBundle {
    /// The `<name>.bundle` directory.
    pub root: PathBuf,
    /// Values written to Info.plist.
    pub descriptor: BundleDescriptor,
    /// Number of payload files copied into `Contents/Resources`.
    pub file_count: usize,
}

#[derive(Serialize, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleDevelopmentRegion")]
    development_region: String,
    #[serde(rename = "CFBundleIdentifier")]
    identifier: String,
    #[serde(rename = "CFBundleInfoDictionaryVersion", default)]
    info_dictionary_version: String,
    #[serde(rename = "CFBundleName")]
    name: String,
    #[serde(rename = "CFBundlePackageType", default)]
    package_type: String,
    #[serde(rename = "CFBundleShortVersionString", default)]
    short_version: String,
    #[serde(rename = "CFBundleSignature", default)]
    signature: String,
    #[serde(rename = "CFBundleVersion", default)]
    version: String,
    #[serde(rename = "NSPrincipalClass", default)]
    principal_class: String,
}

impl InfoPlist {
    fn for_spec(spec: &BundleSpec) -> Self {
        Self {
            development_region: spec.development_region.clone(),
            identifier: spec.identifier.clone(),
            info_dictionary_version: "6.0".to_string(),
            name: spec.bundle_name.clone(),
            package_type: "BNDL".to_string(),
            short_version: "1.0".to_string(),
            signature: "????".to_string(),
            version: "1".to_string(),
            principal_class: String::new(),
        }
    }
}

/// Paths of a loadable bundle rooted in some destination directory.
#[derive(Clone, Debug)]
pub struct LoadableBundle {
    directory: PathBuf,
    spec: BundleSpec,
}

impl LoadableBundle {
    /// Describes a bundle named `spec.bundle_name` inside `directory`.
    pub fn new(directory: impl Into<PathBuf>, spec: BundleSpec) -> Self {
        Self {
            directory: directory.into(),
            spec,
        }
    }

    /// `<directory>/<name>.bundle`
    pub fn bundle_dir(&self) -> PathBuf {
        self.directory.join(format!("{}.bundle", self.spec.bundle_name))
    }

    /// `<bundle>/Contents`
    pub fn contents_dir(&self) -> PathBuf {
        self.bundle_dir().join("Contents")
    }

    /// `<bundle>/Contents/Resources`
    pub fn resources_dir(&self) -> PathBuf {
        self.contents_dir().join("Resources")
    }

    /// `<bundle>/Contents/Info.plist`
    pub fn info_plist_path(&self) -> PathBuf {
        self.contents_dir().join("Info.plist")
    }

    /// Recreates the bundle directory structure and writes Info.plist.
    pub async fn write_skeleton(&self) -> Result<()> {
        let bundle_dir = self.bundle_dir();
        fs::create_dir_all(&bundle_dir, true).await?;
        fs::create_dir_all(&self.resources_dir(), false).await?;

        let mut plist_bytes = Vec::new();
        let plist_path = self.info_plist_path();
        plist::to_writer_xml(&mut plist_bytes, &InfoPlist::for_spec(&self.spec)).map_err(
            |error| Error::Plist {
                path: plist_path.clone(),
                error,
            },
        )?;

        tokio::fs::write(&plist_path, plist_bytes)
            .await
            .fs_context("writing Info.plist", &plist_path)?;

        log::debug!("Wrote bundle skeleton at {}", bundle_dir.display());
        Ok(())
    }

    /// Reads the identifying values back from an existing bundle directory.
    pub async fn read_descriptor(bundle_dir: &Path) -> Result<BundleDescriptor> {
        let plist_path = bundle_dir.join("Contents").join("Info.plist");
        let bytes = tokio::fs::read(&plist_path)
            .await
            .fs_context("reading Info.plist", &plist_path)?;

        let info: InfoPlist = plist::from_bytes(&bytes).map_err(|error| Error::Plist {
            path: plist_path.clone(),
            error,
        })?;

        Ok(BundleDescriptor {
            identifier: info.identifier,
            name: info.name,
            development_region: info.development_region,
        })
    }
}

/// Writes a bundle for `spec` into `destination`, copying every file under
/// `resource_root` into its `Contents/Resources`.
///
/// Re-running with the same inputs replaces the previous bundle.
///
/// # Errors
///
/// Fails if `resource_root` is not a readable directory or the destination is
/// not writable.
pub async fn write_bundle(
    resource_root: &Path,
    destination: &Path,
    spec: &BundleSpec,
) -> Result<ResourceBundle> {
    if !resource_root.is_dir() {
        return Err(Error::Fs {
            context: "reading resource root".to_string(),
            path: resource_root.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let bundle = LoadableBundle::new(destination, spec.clone());
    bundle.write_skeleton().await?;

    let file_count = fs::copy_dir_contents(resource_root, &bundle.resources_dir()).await?;

    log::info!(
        "Bundled {} resource file(s) into {}",
        file_count,
        bundle.bundle_dir().display()
    );

    Ok(ResourceBundle {
        root: bundle.bundle_dir(),
        descriptor: BundleDescriptor {
            identifier: spec.identifier.clone(),
            name: spec.bundle_name.clone(),
            development_region: spec.development_region.clone(),
        },
        file_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec() -> BundleSpec {
        BundleSpec {
            bundle_name: "library:shared".to_string(),
            identifier: "com.example.shared.MR".to_string(),
            development_region: "de".to_string(),
        }
    }

    fn resource_root(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("res");
        std::fs::create_dir_all(root.join("base.lproj")).unwrap();
        std::fs::write(root.join("icon.png"), b"\x89PNG").unwrap();
        std::fs::write(root.join("base.lproj/Localizable.strings"), b"\"a\" = \"b\";").unwrap();
        root
    }

    #[tokio::test]
    async fn descriptor_round_trips() {
        let temp = TempDir::new().unwrap();
        let root = resource_root(&temp);
        let dest = temp.path().join("out");

        let bundle = write_bundle(&root, &dest, &spec()).await.unwrap();
        let read = LoadableBundle::read_descriptor(&bundle.root).await.unwrap();

        assert_eq!(read, bundle.descriptor);
        assert_eq!(read.identifier, "com.example.shared.MR");
        assert_eq!(read.name, "library:shared");
        assert_eq!(read.development_region, "de");
    }

    #[tokio::test]
    async fn payload_lands_in_contents_resources() {
        let temp = TempDir::new().unwrap();
        let root = resource_root(&temp);
        let dest = temp.path().join("out");

        let bundle = write_bundle(&root, &dest, &spec()).await.unwrap();

        assert_eq!(bundle.root, dest.join("library:shared.bundle"));
        assert_eq!(bundle.file_count, 2);
        let resources = bundle.root.join("Contents/Resources");
        assert_eq!(std::fs::read(resources.join("icon.png")).unwrap(), b"\x89PNG");
        assert!(resources.join("base.lproj/Localizable.strings").is_file());
    }

    #[tokio::test]
    async fn rewriting_replaces_previous_bundle() {
        let temp = TempDir::new().unwrap();
        let root = resource_root(&temp);
        let dest = temp.path().join("out");

        write_bundle(&root, &dest, &spec()).await.unwrap();
        std::fs::remove_file(root.join("icon.png")).unwrap();
        let bundle = write_bundle(&root, &dest, &spec()).await.unwrap();

        assert_eq!(bundle.file_count, 1);
        assert!(!bundle.root.join("Contents/Resources/icon.png").exists());
        let bundles: Vec<_> = std::fs::read_dir(&dest).unwrap().collect();
        assert_eq!(bundles.len(), 1);
    }

    #[tokio::test]
    async fn info_plist_is_xml_with_bundle_package_type() {
        let temp = TempDir::new().unwrap();
        let root = resource_root(&temp);
        let bundle = write_bundle(&root, temp.path(), &spec()).await.unwrap();

        let xml = std::fs::read_to_string(bundle.root.join("Contents/Info.plist")).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<key>CFBundlePackageType</key>"));
        assert!(xml.contains("<string>BNDL</string>"));
    }

    #[tokio::test]
    async fn missing_resource_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = write_bundle(&temp.path().join("nope"), temp.path(), &spec()).await;
        assert!(result.is_err());
    }
}
