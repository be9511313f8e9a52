//! Word segmentation applied to questions before encoding.
//!
//! Languages written without spaces (Chinese) embed better once split
//! into words. Segmentation cannot fail: a segmenter that could not load
//! its dictionaries still cuts with the built-in one.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use jieba_rs::Jieba;
use tracing::{info, warn};

/// Pure `text -> text` transform.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> String;
}

/// Returns the input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSegmenter;

impl Segmenter for NoopSegmenter {
    fn segment(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Chinese word segmentation via `jieba-rs`, HMM enabled.
///
/// Words are joined with single spaces; whitespace-only tokens are dropped.
pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl JiebaSegmenter {
    /// Built-in dictionary plus the given user dictionaries.
    ///
    /// A dictionary that cannot be opened or parsed is logged and skipped.
    pub fn new<P: AsRef<Path>>(dict_paths: &[P]) -> Self {
        let mut jieba = Jieba::new();
        let mut loaded = 0usize;
        for path in dict_paths {
            let path = path.as_ref();
            match load_user_dict(&mut jieba, path) {
                Ok(()) => loaded += 1,
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "jieba user dictionary skipped");
                }
            }
        }
        info!(user_dicts = loaded, "JiebaSegmenter initialized");
        Self { jieba }
    }

    /// Splits a `:`-separated path list, ignoring empty entries.
    pub fn split_paths(list: &str) -> Vec<PathBuf> {
        list.split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new::<PathBuf>(&[])
    }
}

fn load_user_dict(jieba: &mut Jieba, path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    jieba
        .load_dict(&mut BufReader::new(file))
        .map_err(|e| e.to_string())
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> String {
        self.jieba
            .cut(text, true)
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_is_identity() {
        assert_eq!(NoopSegmenter.segment("  What is X?  "), "  What is X?  ");
    }

    #[test]
    fn jieba_splits_chinese_into_words() {
        let seg = JiebaSegmenter::default();
        let out = seg.segment("我们中出了一个叛徒");
        assert!(out.contains(' '));
        assert_eq!(out.replace(' ', ""), "我们中出了一个叛徒");
    }

    #[test]
    fn jieba_collapses_whitespace_tokens() {
        let seg = JiebaSegmenter::default();
        let out = seg.segment("hello   world");
        assert!(!out.contains("  "));
        assert!(!out.starts_with(' ') && !out.ends_with(' '));
        assert_eq!(out.replace(' ', ""), "helloworld");
    }

    #[test]
    fn missing_dictionary_is_skipped() {
        let seg = JiebaSegmenter::new(&["/definitely/not/here.txt"]);
        assert!(!seg.segment("北京").is_empty());
    }

    #[test]
    fn split_paths_ignores_empties() {
        assert_eq!(
            JiebaSegmenter::split_paths("a.txt::b.txt: "),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }
}
