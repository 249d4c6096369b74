//! Splitting rendered blobs back into discrete files.

use crate::app::render::SEPARATOR;
use crate::domain::errors::AlignmentFault;
use crate::domain::model::RenderedUnit;

/// Output of splitting one file's rendered path and content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demuxed {
    pub units: Vec<RenderedUnit>,
    /// Set when path and content split into a different number of segments.
    pub fault: Option<AlignmentFault>,
}

/// Split both blobs on the separator and pair segments by position.
///
/// Each segment loses its leading and trailing newlines only. Pairs that end up entirely
/// empty are dropped, as are pairs with content but no path. On a segment count mismatch
/// nothing is paired, since the positions no longer correspond, and the mismatch is
/// reported in [`Demuxed::fault`].
pub fn demultiplex(source_path: &str, path_blob: &str, content_blob: &str) -> Demuxed {
    let paths: Vec<&str> = path_blob.split(SEPARATOR).collect();
    let contents: Vec<&str> = content_blob.split(SEPARATOR).collect();

    if paths.len() != contents.len() {
        let fault = AlignmentFault {
            source_path: source_path.to_owned(),
            path_segments: paths.len(),
            content_segments: contents.len(),
        };
        tracing::warn!(%fault, "path and content segments are misaligned; skipping file");
        return Demuxed {
            units: Vec::new(),
            fault: Some(fault),
        };
    }

    let mut units = Vec::with_capacity(paths.len());
    for (path, content) in paths.iter().zip(contents.iter()) {
        let path = trim_newlines(path);
        let content = trim_newlines(content);
        if path.is_empty() {
            if !content.is_empty() {
                tracing::warn!(
                    source = source_path,
                    "rendered content has an empty path; dropping it"
                );
            }
            continue;
        }
        units.push(RenderedUnit::new(path, content));
    }

    Demuxed { units, fault: None }
}

fn trim_newlines(segment: &str) -> &str {
    segment.trim_matches('\n')
}
