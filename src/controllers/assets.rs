//! Static asset serving for the companion front end.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::response::{Outcome, Payload};

/// File reader for the front-end assets, rooted at one directory with the
/// layout `html/`, `css/`, `js/`.
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn signin_page(&self) -> Result<String, Error> {
        self.read_text("html/signin.html").await
    }

    pub async fn signup_page(&self) -> Result<String, Error> {
        self.read_text("html/signup.html").await
    }

    pub async fn stylesheet(&self) -> Result<Vec<u8>, Error> {
        self.read_bytes("css/styles.css").await
    }

    pub async fn script(&self) -> Result<Vec<u8>, Error> {
        self.read_bytes("js/app.js").await
    }

    async fn read_text(&self, rel: &str) -> Result<String, Error> {
        let path = self.root.join(rel);
        debug!(path = %path.display(), "reading asset");
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn read_bytes(&self, rel: &str) -> Result<Vec<u8>, Error> {
        let path = self.root.join(rel);
        debug!(path = %path.display(), "reading asset");
        Ok(tokio::fs::read(path).await?)
    }
}

/// Handlers for `/frontend/css` and `/frontend/js`. A missing or unreadable
/// file is an infrastructure failure and surfaces as the server loop's 500.
pub struct AssetsController {
    assets: Arc<Assets>,
}

impl AssetsController {
    pub fn new(assets: Arc<Assets>) -> Self {
        Self { assets }
    }

    pub async fn get_css(&self) -> Result<Outcome, Error> {
        let data = self.assets.stylesheet().await?;
        Ok(Outcome::Success(Payload::Bytes { content_type: "text/css", data }))
    }

    pub async fn get_js(&self) -> Result<Outcome, Error> {
        let data = self.assets.script().await?;
        Ok(Outcome::Success(Payload::Bytes {
            content_type: "application/javascript",
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fixture() -> (tempfile::TempDir, Arc<Assets>) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("css")).expect("mkdir");
        fs::create_dir_all(dir.path().join("js")).expect("mkdir");
        fs::write(dir.path().join("css/styles.css"), "body {}").expect("write");
        fs::write(dir.path().join("js/app.js"), "void 0;").expect("write");
        let assets = Arc::new(Assets::new(dir.path()));
        (dir, assets)
    }

    #[tokio::test]
    async fn serves_css_and_js_verbatim() {
        let (_dir, assets) = fixture();
        let ctrl = AssetsController::new(assets);

        match ctrl.get_css().await.expect("css readable") {
            Outcome::Success(Payload::Bytes { content_type, data }) => {
                assert_eq!(content_type, "text/css");
                assert_eq!(data, b"body {}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        match ctrl.get_js().await.expect("js readable") {
            Outcome::Success(Payload::Bytes { content_type, .. }) => {
                assert_eq!(content_type, "application/javascript");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctrl = AssetsController::new(Arc::new(Assets::new(dir.path())));
        assert!(matches!(ctrl.get_css().await, Err(Error::Io(_))));
    }
}
