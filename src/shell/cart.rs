use super::{AssetKind, Storage};
use crate::error;
use crate::lang::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

type Result<T> = std::result::Result<T, Error>;

pub const MANIFEST: &str = "cart.json";
pub const MAIN: &str = "main.bas";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub kind: AssetKind,
    pub name: String,
    pub crc32: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub created: DateTime<Utc>,
    pub saved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// ## Cart
///
/// A directory bundling a program with its assets:
///
/// ```text
/// game/
///   cart.json
///   main.bas
///   script/  image/  sound/  data/
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    root: PathBuf,
    manifest: Manifest,
}

impl Cart {
    pub fn create(storage: &dyn Storage, root: &Path) -> Result<Cart> {
        if storage.exists(root) {
            return Err(error!(FileAlreadyExists; &root.display().to_string()));
        }
        let name = root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| error!(BadFileName; &root.display().to_string()))?;
        storage.create_dir(root)?;
        for kind in AssetKind::ALL.iter() {
            storage.create_dir(&root.join(kind.dir()))?;
        }
        storage.write(&root.join(MAIN), b"")?;
        let cart = Cart {
            root: root.to_path_buf(),
            manifest: Manifest {
                name,
                created: Utc::now(),
                saved: None,
                assets: vec![],
            },
        };
        cart.write_manifest(storage)?;
        info!(cart = %cart.manifest.name, "created cart");
        Ok(cart)
    }

    pub fn open(storage: &dyn Storage, root: &Path) -> Result<Cart> {
        let bytes = storage.read(&root.join(MANIFEST))?;
        let manifest: Manifest = serde_json::from_slice(&bytes)
            .map_err(|e| error!(DiskIoError; &format!("{}: {}", MANIFEST, e)))?;
        info!(cart = %manifest.name, "opened cart");
        Ok(Cart {
            root: root.to_path_buf(),
            manifest,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Text of `main.bas` if the cart has one.
    pub fn program(&self, storage: &dyn Storage) -> Result<Option<String>> {
        let path = self.root.join(MAIN);
        if !storage.exists(&path) {
            return Ok(None);
        }
        let bytes = storage.read(&path)?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| error!(DiskIoError; "PROGRAM IS NOT UTF-8"))
    }

    /// Write the program and refresh every asset checksum.
    pub fn save(&mut self, storage: &dyn Storage, program: &str) -> Result<()> {
        storage.write(&self.root.join(MAIN), program.as_bytes())?;
        let mut assets = vec![];
        for &kind in AssetKind::ALL.iter() {
            let dir = self.root.join(kind.dir());
            if !storage.exists(&dir) {
                continue;
            }
            for entry in storage.list(&dir)? {
                if entry.is_dir {
                    continue;
                }
                let crc32 = checksum(storage, &dir.join(&entry.name))?;
                assets.push(Asset {
                    kind,
                    name: entry.name,
                    crc32,
                });
            }
        }
        self.manifest.assets = assets;
        self.manifest.saved = Some(Utc::now());
        self.write_manifest(storage)?;
        info!(cart = %self.manifest.name, assets = self.manifest.assets.len(), "saved cart");
        Ok(())
    }

    /// Copy a file into the cart under `kind` as `dest`.
    pub fn copy(
        &mut self,
        storage: &dyn Storage,
        kind: AssetKind,
        src: &Path,
        dest: &str,
    ) -> Result<&Asset> {
        if dest.is_empty() || dest.contains(|c| c == '/' || c == '\\') || dest == ".." {
            return Err(error!(BadFileName; dest));
        }
        let dir = self.root.join(kind.dir());
        if !storage.exists(&dir) {
            storage.create_dir(&dir)?;
        }
        let to = dir.join(dest);
        storage.copy(src, &to)?;
        let asset = Asset {
            kind,
            name: dest.to_string(),
            crc32: checksum(storage, &to)?,
        };
        let assets = &mut self.manifest.assets;
        let index = match assets.iter().position(|a| a.kind == kind && a.name == dest) {
            Some(index) => {
                assets[index] = asset;
                index
            }
            None => {
                assets.push(asset);
                assets.len() - 1
            }
        };
        self.write_manifest(storage)?;
        Ok(&self.manifest.assets[index])
    }

    fn write_manifest(&self, storage: &dyn Storage) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.manifest)
            .map_err(|e| error!(InternalError; &e.to_string()))?;
        storage.write(&self.root.join(MANIFEST), &json)
    }
}

fn checksum(storage: &dyn Storage, path: &Path) -> Result<u32> {
    Ok(crc::crc32::checksum_ieee(&storage.read(path)?))
}
