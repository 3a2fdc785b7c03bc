//! Post-composition transforms.
//!
//! A transform is a named pure function from bytes to bytes. The pipeline
//! maps each [`BundleKind`] to an ordered list of transforms; the composer
//! runs them after concatenation and never looks inside.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::definition::BundleKind;

/// Failure reported by a transform.
#[derive(Debug, Error)]
#[error("transform `{transform}` failed: {message}")]
pub struct TransformError {
    /// Name of the failing transform.
    pub transform: String,
    /// What went wrong.
    pub message: String,
}

impl TransformError {
    /// Create a transform error.
    pub fn new(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            message: message.into(),
        }
    }
}

type TransformFn = dyn Fn(Vec<u8>) -> Result<Vec<u8>, TransformError> + Send + Sync;

/// A named byte-to-byte transform.
#[derive(Clone)]
pub struct Transform {
    name: Cow<'static, str>,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Wrap a closure as a transform.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let banner = Transform::new("banner", |mut bytes| {
    ///     bytes.splice(0..0, b"/* built */\n".iter().copied());
    ///     Ok(bytes)
    /// });
    /// ```
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(Vec<u8>) -> Result<Vec<u8>, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Transform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the transform.
    pub fn apply(&self, input: Vec<u8>) -> Result<Vec<u8>, TransformError> {
        (self.func)(input)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Ordered transforms per bundle kind.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    stages: FxHashMap<BundleKind, Vec<Transform>>,
}

impl TransformPipeline {
    /// Create an empty pipeline (bundles pass through unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform for `kind`.
    pub fn with(mut self, kind: BundleKind, transform: Transform) -> Self {
        self.push(kind, transform);
        self
    }

    /// Append a transform for `kind` in place.
    pub fn push(&mut self, kind: BundleKind, transform: Transform) {
        self.stages.entry(kind).or_default().push(transform);
    }

    /// Transforms configured for `kind`, in order.
    pub fn stages(&self, kind: BundleKind) -> &[Transform] {
        self.stages.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run every transform for `kind` in order.
    pub fn apply(&self, kind: BundleKind, input: Vec<u8>) -> Result<Vec<u8>, TransformError> {
        self.stages(kind)
            .iter()
            .try_fold(input, |bytes, transform| transform.apply(bytes))
    }
}

// =============================================================================
// Built-in Transforms
// =============================================================================

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_newlines() -> Transform {
    Transform::new("normalize-newlines", |input: Vec<u8>| {
        let mut out = Vec::with_capacity(input.len());
        let mut iter = input.iter().copied().peekable();
        while let Some(byte) = iter.next() {
            if byte == b'\r' {
                if iter.peek() == Some(&b'\n') {
                    iter.next();
                }
                out.push(b'\n');
            } else {
                out.push(byte);
            }
        }
        Ok(out)
    })
}

/// Gzip-compress the bundle.
#[cfg(feature = "gzip")]
pub fn gzip() -> Transform {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    Transform::new("gzip", |input: Vec<u8>| {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&input)
            .map_err(|e| TransformError::new("gzip", e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| TransformError::new("gzip", e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(name: &'static str, suffix: &'static [u8]) -> Transform {
        Transform::new(name, move |mut bytes: Vec<u8>| {
            bytes.extend_from_slice(suffix);
            Ok(bytes)
        })
    }

    #[test]
    fn test_empty_pipeline_passes_through() {
        let pipeline = TransformPipeline::new();
        assert_eq!(pipeline.apply(BundleKind::Script, b"abc".to_vec()).unwrap(), b"abc");
    }

    #[test]
    fn test_transforms_run_in_order_per_kind() {
        let pipeline = TransformPipeline::new()
            .with(BundleKind::Script, append("one", b"1"))
            .with(BundleKind::Script, append("two", b"2"))
            .with(BundleKind::Style, append("css", b"c"));

        assert_eq!(pipeline.apply(BundleKind::Script, b"x".to_vec()).unwrap(), b"x12");
        assert_eq!(pipeline.apply(BundleKind::Style, b"x".to_vec()).unwrap(), b"xc");
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let pipeline = TransformPipeline::new()
            .with(
                BundleKind::Script,
                Transform::new("broken", |_| Err(TransformError::new("broken", "nope"))),
            )
            .with(BundleKind::Script, append("never", b"!"));

        let err = pipeline.apply(BundleKind::Script, Vec::new()).unwrap_err();
        assert_eq!(err.transform, "broken");
    }

    #[test]
    fn test_normalize_newlines() {
        let out = normalize_newlines().apply(b"a\r\nb\rc\n".to_vec()).unwrap();
        assert_eq!(out, b"a\nb\nc\n");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_gzip_round_trip() {
        use std::io::Read;

        let compressed = gzip().apply(b"body { margin: 0 }".to_vec()).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "body { margin: 0 }");
    }
}
