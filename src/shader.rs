use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tracing::error;

/// Path of the reference coverage fragment shader shipped with the crate.
pub const COVERAGE_SHADER_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/coverage.frag");

/// A fragment shader program fetched once, off the render thread.
///
/// The render loop polls; until the fetch resolves the shader is simply
/// unavailable and shadow-caster creation stays suspended. A failed fetch
/// parks the handle in [`ShaderState::Failed`]. The frustum outline is
/// unaffected either way.
#[derive(Debug)]
pub struct ShaderHandle {
    fetch: Fetch,
}

#[derive(Debug)]
enum Fetch {
    Pending(mpsc::Receiver<Result<String, io::Error>>),
    Ready(String),
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaderState<'a> {
    Loading,
    Ready(&'a str),
    Failed,
}

impl ShaderHandle {
    /// Starts reading `path` on a background thread; [`ShaderHandle::poll`]
    /// observes progress without ever blocking.
    pub fn fetch(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = std::fs::read_to_string(&path)
                .map(|text| strip_module_wrapper(&text).to_owned());
            // The receiver may already be gone on shutdown.
            let _ = tx.send(result);
        });

        Self {
            fetch: Fetch::Pending(rx),
        }
    }

    /// Wraps source text already in memory; immediately ready.
    pub fn from_source(source: impl AsRef<str>) -> Self {
        Self {
            fetch: Fetch::Ready(strip_module_wrapper(source.as_ref()).to_owned()),
        }
    }

    pub fn poll(&mut self) -> ShaderState<'_> {
        if let Fetch::Pending(rx) = &self.fetch {
            match rx.try_recv() {
                Ok(Ok(text)) => self.fetch = Fetch::Ready(text),
                Ok(Err(err)) => {
                    error!(%err, "failed to fetch the coverage shader");
                    self.fetch = Fetch::Failed;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("shader fetch thread exited without a result");
                    self.fetch = Fetch::Failed;
                }
            }
        }

        match &self.fetch {
            Fetch::Pending(_) => ShaderState::Loading,
            Fetch::Ready(text) => ShaderState::Ready(text),
            Fetch::Failed => ShaderState::Failed,
        }
    }
}

/// Extracts the program text from a JS-module wrapper, if present.
///
/// Sources historically shipped as `export default` modules quoting the
/// program in backticks or quotes; bare GLSL passes through untouched.
fn strip_module_wrapper(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("export default") else {
        return trimmed;
    };

    let rest = rest.trim().trim_end_matches(';').trim_end();
    for quote in ['`', '"', '\''] {
        if let Some(inner) = rest
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
        {
            return inner;
        }
    }

    rest.trim_start()
}
