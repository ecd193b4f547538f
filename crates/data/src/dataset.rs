use std::{
    cmp::Ordering,
    collections::HashMap,
    path::{Path, PathBuf},
    time::Instant,
};

use walkdir::WalkDir;

use crate::DataError;

pub const IMG_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Labeled images laid out as `root/<class>/<image>`.
///
/// Classes are the directories that contain images, relative to `root`,
/// in natural order. A class nested several levels deep is named by its
/// path components joined with `_`.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<(PathBuf, usize)>,
    classes: Vec<String>,
}

impl Dataset {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, DataError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DataError::NotFound(root.to_path_buf()));
        }

        let start = Instant::now();
        let mut images = vec![];
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_image(path) {
                continue;
            }
            let class = class_name(root, path);
            images.push((path.to_path_buf(), class));
        }
        if images.is_empty() {
            return Err(DataError::NoImages(root.to_path_buf()));
        }

        let mut classes = images.iter().map(|(_, c)| c.clone()).collect::<Vec<_>>();
        classes.sort_by(|a, b| natural_cmp(a, b).then_with(|| a.cmp(b)));
        classes.dedup();

        images.sort_by(|(a, _), (b, _)| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect::<HashMap<_, _>>();
        let samples = images
            .iter()
            .map(|(path, class)| (path.clone(), class_to_idx[class.as_str()]))
            .collect::<Vec<_>>();

        log::info!(
            "open dataset: {} images, {} classes under {:?}, finished in {:?}",
            samples.len(),
            classes.len(),
            root,
            start.elapsed()
        );

        Ok(Self {
            samples,
            classes,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn samples(&self) -> &[(PathBuf, usize)] {
        &self.samples
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMG_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

fn class_name(root: &Path, path: &Path) -> String {
    let parent = path.parent().unwrap_or(root);
    let rel = parent.strip_prefix(root).unwrap_or(parent);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Text(String),
    // (digit count without leading zeros, digits) orders numerically.
    Num(usize, String),
}

fn natural_key(s: &str) -> Vec<Chunk> {
    let s = s.to_lowercase();
    let mut chunks = vec![];
    let mut rest = s.as_str();
    while !rest.is_empty() {
        let is_digit = rest.starts_with(|c: char| c.is_ascii_digit());
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        if is_digit {
            let digits = chunk.trim_start_matches('0');
            chunks.push(Chunk::Num(digits.len(), digits.to_string()));
        } else {
            chunks.push(Chunk::Text(chunk.to_string()));
        }
        rest = tail;
    }
    chunks
}

/// Compares strings so that embedded numbers sort by value, e.g.
/// `img2.png < img10.png`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

#[test]
fn natural_order() {
    let mut names = vec!["img10.png", "img2.png", "IMG1.png", "img02.png", "a"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(names, vec!["a", "IMG1.png", "img2.png", "img02.png", "img10.png"]);
}

#[test]
fn natural_order_classes() {
    let mut names = vec!["n01440764", "n01443537", "class_10", "class_9"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(names, vec!["class_9", "class_10", "n01440764", "n01443537"]);
}
