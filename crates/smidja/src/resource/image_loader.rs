//! Filesystem texture loader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ResourceError;
use crate::math::UVec2;

use super::{ResourceLoader, Texture, TextureHandle};

/// Prefix for project-relative resource paths.
const RES_PREFIX: &str = "res://";

/// Loads textures from a project directory on disk.
///
/// `res://` paths are resolved against the project directory, as are plain
/// relative paths. Only the image header is read: the assembler needs a
/// texture's size, not its pixels.
#[derive(Debug)]
pub struct ImageLoader {
    project_dir: PathBuf,
    handles: HashMap<PathBuf, TextureHandle>,
}

impl ImageLoader {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            handles: HashMap::new(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Map a resource path to a file path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        match path.strip_prefix(RES_PREFIX) {
            Some(rest) => self.project_dir.join(rest),
            None => {
                let p = Path::new(path);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    self.project_dir.join(p)
                }
            }
        }
    }
}

impl ResourceLoader for ImageLoader {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
        let file = self.resolve(path);
        if !file.is_file() {
            return Err(ResourceError::NotFound(path.to_string()));
        }

        let (width, height) =
            image::image_dimensions(&file).map_err(|e| ResourceError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let key = file.canonicalize().unwrap_or(file);
        let next = TextureHandle(self.handles.len() as u32);
        let handle = *self.handles.entry(key).or_insert(next);

        Ok(Texture::new(handle, path, UVec2::new(width, height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_res_paths_against_project_dir() {
        let loader = ImageLoader::new("/game");
        assert_eq!(
            loader.resolve("res://assets/knight.png"),
            PathBuf::from("/game/assets/knight.png")
        );
        assert_eq!(
            loader.resolve("assets/knight.png"),
            PathBuf::from("/game/assets/knight.png")
        );
    }

    #[test]
    fn reads_dimensions_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sprites")).unwrap();
        image::RgbaImage::new(64, 32)
            .save(dir.path().join("sprites/hero.png"))
            .unwrap();

        let mut loader = ImageLoader::new(dir.path());
        let a = loader.load_texture("res://sprites/hero.png").unwrap();
        let b = loader.load_texture("sprites/hero.png").unwrap();

        assert_eq!(a.size(), UVec2::new(64, 32));
        assert_eq!(a.handle(), b.handle());
    }

    #[test]
    fn missing_and_undecodable_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let mut loader = ImageLoader::new(dir.path());
        assert!(matches!(
            loader.load_texture("res://absent.png"),
            Err(ResourceError::NotFound(_))
        ));
        assert!(matches!(
            loader.load_texture("res://broken.png"),
            Err(ResourceError::Decode { .. })
        ));
    }
}
