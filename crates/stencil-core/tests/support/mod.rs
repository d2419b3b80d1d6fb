//! Shared fixtures: an in-memory HTTP transport, a scripted cloner, a
//! tarball builder and on-disk git repositories.

#![allow(dead_code)]

pub mod git;

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use futures::StreamExt;

use stencil_core::clone::TemplateCloner;
use stencil_core::error::{FetchError, FetchResult};
use stencil_core::fetch::TemplateFetcher;
use stencil_core::http::{HttpResponse, HttpTransport};

/// A scripted reply for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with this body
    Body(Vec<u8>),
    /// 302 with an optional `Location`
    Redirect(Option<String>),
    /// Any other status with an empty body
    Status(u16),
}

/// Answers requests from a per-URL script and records every URL requested.
/// Unscripted URLs fail with a network error.
#[derive(Debug, Default)]
pub struct CannedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `url`. The last reply for a URL repeats.
    pub fn route(self, url: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes
                .get_mut(url)
                .ok_or_else(|| FetchError::network(url, "connection refused"))?;
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        };

        let (status, location, body) = match reply {
            Reply::Body(data) => (200, None, data),
            Reply::Redirect(location) => (302, location, Vec::new()),
            Reply::Status(status) => (status, None, Vec::new()),
        };

        // Deliver the body in small chunks so readers see a real stream.
        let chunks: Vec<FetchResult<Bytes>> = body
            .chunks(7)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        Ok(HttpResponse {
            status,
            location,
            body: futures::stream::iter(chunks).boxed(),
        })
    }
}

/// Scripted clone collaborator.
#[derive(Debug)]
pub struct FakeCloner {
    outcome: Result<Vec<(String, String)>, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCloner {
    /// Fails every call with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Writes `files` into the destination.
    pub fn writing(files: &[(&str, &str)]) -> Self {
        Self {
            outcome: Ok(files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemplateCloner for FakeCloner {
    async fn materialize(&self, spec: &str, destination: &Path) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(spec.to_string());
        match &self.outcome {
            Err(message) => anyhow::bail!("{}", message),
            Ok(files) => {
                for (path, contents) in files {
                    let target = destination.join(path);
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(target, contents)?;
                }
                Ok(())
            }
        }
    }
}

/// Fetcher wired to the given fakes.
pub fn fetcher(transport: &Arc<CannedTransport>, cloner: &Arc<FakeCloner>) -> TemplateFetcher {
    TemplateFetcher::new(transport.clone(), cloner.clone())
}

/// Gzipped tarball of regular files; directories are implied by paths.
pub fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

/// Relative paths of all regular files under `root`, sorted.
pub fn files_under(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
