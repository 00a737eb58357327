//! Image viewer
//!
//! Prints an image's metadata block and/or hands the file to an external
//! viewer. Holds no state of its own beyond a reference to the store.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use aimg_common::DisplayMode;

use crate::models::ImageId;
use crate::services::metadata_store::MetadataStore;

/// Prompts longer than this are truncated in the metadata block
pub const PROMPT_DISPLAY_LIMIT: usize = 100;

const RULE_WIDTH: usize = 50;

/// Opens an image file for the user
pub trait ImageOpener {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Launches the platform's default image viewer without waiting for it
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl ImageOpener for SystemOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };

        command
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

/// Metadata printer and image launcher
pub struct ImageViewer<'a> {
    store: &'a MetadataStore,
    opener: Box<dyn ImageOpener + 'a>,
}

impl<'a> ImageViewer<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self::with_opener(store, Box::new(SystemOpener))
    }

    pub fn with_opener(store: &'a MetadataStore, opener: Box<dyn ImageOpener + 'a>) -> Self {
        Self { store, opener }
    }

    /// Human-readable metadata block for `id`; absent values print as `N/A`
    pub fn render_metadata(&self, id: ImageId) -> String {
        let store = self.store;
        let na = |value: Option<&str>| value.unwrap_or("N/A").to_string();

        let prompt = match store.prompt(id) {
            Some(p) if p.chars().count() > PROMPT_DISPLAY_LIMIT => {
                let truncated: String = p.chars().take(PROMPT_DISPLAY_LIMIT).collect();
                format!("{}...", truncated)
            }
            other => na(other),
        };

        let dimensions = match store.dimensions(id) {
            (Some(w), Some(h)) => format!("{}x{} pixels", w, h),
            _ => "N/A".to_string(),
        };

        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        out.push_str(&format!("{}\n", rule));
        out.push_str(&format!("Image metadata [{}]\n", id));
        out.push_str(&format!("{}\n", rule));
        out.push_str(&format!(" Dimensions: {}\n", dimensions));
        out.push_str(&format!(" Prompt:     {}\n", prompt));
        out.push_str(&format!(" Model:      {}\n", na(store.model(id))));
        out.push_str(&format!(" Seed:       {}\n", na(store.seed(id))));
        out.push_str(&format!(" CFG Scale:  {}\n", na(store.cfg_scale(id))));
        out.push_str(&format!(" Steps:      {}\n", na(store.steps(id))));
        out.push_str(&format!(" Sampler:    {}\n", na(store.sampler(id))));
        out.push_str(&format!(" Generated:  {}\n", na(store.generated(id))));
        out.push_str(&format!(" Created:    {}\n", na(store.created_date(id))));
        out.push_str(&format!(" ID:         {}\n", id));
        out.push_str(&format!(" File:       {}\n", na(store.file_path(id))));
        out.push_str(&rule);
        out.push('\n');
        out
    }

    /// Present `id` according to `mode`
    ///
    /// Returns true when the image was handed to the opener. A missing
    /// record or a failing opener is logged, never an error; only writes
    /// to `out` can fail.
    pub fn show_image(
        &self,
        id: ImageId,
        mode: DisplayMode,
        out: &mut dyn Write,
    ) -> io::Result<bool> {
        if mode.shows_metadata() {
            out.write_all(self.render_metadata(id).as_bytes())?;
        }

        if !mode.shows_image() {
            return Ok(false);
        }

        let Some(file_path) = self.store.file_path(id) else {
            tracing::error!(id = %id, "Cannot display image: no file path recorded");
            return Ok(false);
        };

        let full_path = self.store.root().join(file_path);
        if !full_path.is_file() {
            tracing::error!(
                file = %full_path.display(),
                "Cannot display image: file does not exist"
            );
            return Ok(false);
        }

        match self.opener.open(&full_path) {
            Ok(()) => {
                tracing::info!(file = %full_path.display(), "Opened image");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(file = %full_path.display(), "Cannot display image: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metadata_extractor::{ExtractedMetadata, MetadataError, MetadataSource};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use uuid::Uuid;

    struct FixedSource(Vec<(&'static str, String)>);

    impl MetadataSource for FixedSource {
        fn extract(&self, _path: &Path) -> Result<ExtractedMetadata, MetadataError> {
            Ok(ExtractedMetadata {
                text: self.0.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
                dimensions: Some((640, 480)),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingOpener(Rc<RefCell<Vec<PathBuf>>>);

    impl ImageOpener for RecordingOpener {
        fn open(&self, path: &Path) -> io::Result<()> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn id() -> ImageId {
        ImageId::new(Uuid::from_u128(11))
    }

    fn loaded_store(root: &Path, prompt: String) -> MetadataStore {
        let mut store = MetadataStore::with_source(
            root,
            Box::new(FixedSource(vec![("Prompt", prompt), ("Model", "SDXL".to_string())])),
        );
        store.add_entry(id(), "a.png");
        store.load_metadata(id());
        store
    }

    #[test]
    fn test_render_metadata_fields() {
        let store = loaded_store(Path::new("/library"), "forest path".to_string());
        let text = ImageViewer::new(&store).render_metadata(id());

        assert!(text.contains(" Dimensions: 640x480 pixels"));
        assert!(text.contains(" Prompt:     forest path"));
        assert!(text.contains(" Model:      SDXL"));
        assert!(text.contains(" Seed:       N/A"));
        assert!(text.contains(" File:       a.png"));
        assert!(text.contains(&id().to_string()));
    }

    #[test]
    fn test_render_truncates_long_prompt() {
        let long = "x".repeat(150);
        let store = loaded_store(Path::new("/library"), long);
        let text = ImageViewer::new(&store).render_metadata(id());
        let expected = format!(" Prompt:     {}...\n", "x".repeat(PROMPT_DISPLAY_LIMIT));
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_render_unknown_identifier() {
        let store = MetadataStore::new("/library");
        let text = ImageViewer::new(&store).render_metadata(id());
        assert!(text.contains(" Dimensions: N/A"));
        assert!(text.contains(" File:       N/A"));
    }

    #[test]
    fn test_show_modes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"").unwrap();
        let store = loaded_store(dir.path(), "p".to_string());
        let opener = RecordingOpener::default();
        let viewer = ImageViewer::with_opener(&store, Box::new(opener.clone()));

        let mut out = Vec::new();
        assert!(!viewer.show_image(id(), DisplayMode::MetadataOnly, &mut out).unwrap());
        assert!(!out.is_empty());
        assert!(opener.0.borrow().is_empty());

        let mut out = Vec::new();
        assert!(viewer.show_image(id(), DisplayMode::ImageOnly, &mut out).unwrap());
        assert!(out.is_empty());
        assert_eq!(opener.0.borrow().as_slice(), &[dir.path().join("a.png")]);

        let mut out = Vec::new();
        assert!(viewer.show_image(id(), DisplayMode::MetadataAndImage, &mut out).unwrap());
        assert!(!out.is_empty());
        assert_eq!(opener.0.borrow().len(), 2);
    }

    #[test]
    fn test_show_missing_file_is_not_opened() {
        let dir = tempfile::tempdir().unwrap();
        let store = loaded_store(dir.path(), "p".to_string());
        let opener = RecordingOpener::default();
        let viewer = ImageViewer::with_opener(&store, Box::new(opener.clone()));

        let mut out = Vec::new();
        assert!(!viewer.show_image(id(), DisplayMode::ImageOnly, &mut out).unwrap());
        assert!(opener.0.borrow().is_empty());
    }
}
