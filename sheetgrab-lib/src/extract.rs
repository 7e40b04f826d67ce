//! Collecting a document's CSS and handing it to the clipboard.

use crate::clipboard::ClipboardSink;
use crate::config::{ExtractorConfig, DEFAULT_PUBLISH_DELAY};
use crate::error::{ClipboardError, PublishError, SheetAccessError};
use crate::schedule::{Scheduler, Task};
use crate::style::rule::CssRuleEntry;
use crate::style::sheet::{resolve_rules, StyleSheetList};
use log::{debug, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Header label for sheets without a source URL.
pub const INLINE_LABEL: &str = "[inline styles]";

/// The outcome of reading one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetScan {
    Rules {
        source: Option<String>,
        rules: Vec<CssRuleEntry>,
    },
    Skipped {
        index: usize,
        source: Option<String>,
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AccessDenied(SheetAccessError),
    /// Neither accessor produced a rule list.
    NoRuleList,
}

/// `/* Stylesheet : <source> */`
pub fn header(source: Option<&str>) -> String {
    format!("/* Stylesheet : {} */", source.unwrap_or(INLINE_LABEL))
}

/// Read every stylesheet of `document`, in document order.
pub fn scan(document: &dyn StyleSheetList) -> Vec<SheetScan> {
    (0..document.len())
        .filter_map(|index| document.item(index).map(|sheet| (index, sheet)))
        .map(|(index, sheet)| {
            let source = sheet.href().map(str::to_string);
            match resolve_rules(sheet) {
                Ok(Some(rules)) => SheetScan::Rules { source, rules },
                Ok(None) => SheetScan::Skipped {
                    index,
                    source,
                    reason: SkipReason::NoRuleList,
                },
                Err(denied) => {
                    debug!("Skipping stylesheet #{}: {}", index, denied);
                    SheetScan::Skipped {
                        index,
                        source,
                        reason: SkipReason::AccessDenied(denied),
                    }
                }
            }
        })
        .collect()
}

/// Concatenate readable sheets: each header followed by its rule texts,
/// with no separators anywhere.
pub fn render(scans: &[SheetScan]) -> String {
    let mut css = String::new();
    for scan in scans {
        if let SheetScan::Rules { source, rules } = scan {
            css.push_str(&header(source.as_deref()));
            for rule in rules {
                css.push_str(&rule.css_text());
            }
        }
    }
    css
}

/// The CSS text of every readable stylesheet of `document`.
pub fn collect(document: &dyn StyleSheetList) -> String {
    render(&scan(document))
}

/// Handle on a scheduled clipboard write.
///
/// Dropping it is fine: the write still happens, its outcome is only logged.
#[derive(Debug)]
pub struct Publication {
    outcome: Receiver<Result<(), ClipboardError>>,
}

impl Publication {
    /// The outcome if the write already ran.
    pub fn try_outcome(&self) -> Option<Result<(), PublishError>> {
        match self.outcome.try_recv() {
            Ok(result) => Some(result.map_err(PublishError::from)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PublishError::Abandoned)),
        }
    }

    /// Block until the write ran, or `timeout` passed.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), PublishError>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(result) => Some(result.map_err(PublishError::from)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(PublishError::Abandoned)),
        }
    }

    /// Block until the write ran.
    pub fn wait(self) -> Result<(), PublishError> {
        match self.outcome.recv() {
            Ok(result) => result.map_err(PublishError::from),
            Err(_) => Err(PublishError::Abandoned),
        }
    }
}

/// Collects a document's CSS and publishes it to a clipboard after a delay.
pub struct StyleExtractor {
    scheduler: Arc<dyn Scheduler>,
    clipboard: Arc<dyn ClipboardSink>,
    publish_delay: Duration,
}

impl StyleExtractor {
    /// Creates a new extractor with the default publish delay.
    pub fn new(scheduler: Arc<dyn Scheduler>, clipboard: Arc<dyn ClipboardSink>) -> Self {
        StyleExtractor {
            scheduler,
            clipboard,
            publish_delay: DEFAULT_PUBLISH_DELAY,
        }
    }

    /// Creates a new extractor using the publish delay from `config`.
    pub fn from_config(
        config: &ExtractorConfig,
        scheduler: Arc<dyn Scheduler>,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        Self::new(scheduler, clipboard).with_publish_delay(config.publish_delay)
    }

    /// Replaces the delay between `publish` and the clipboard write.
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }

    /// The delay between `publish` and the clipboard write.
    pub fn publish_delay(&self) -> Duration {
        self.publish_delay
    }

    /// Same as the free function `collect`.
    pub fn collect(&self, document: &dyn StyleSheetList) -> String {
        collect(document)
    }

    /// Schedule a clipboard write of `text` after the publish delay.
    ///
    /// Returns as soon as the write is scheduled. A failing write is logged
    /// and reported through the returned `Publication`; it never panics into
    /// the scheduler.
    pub fn publish(&self, text: String) -> Result<Publication, PublishError> {
        let (tx, rx) = mpsc::channel();
        let clipboard = Arc::clone(&self.clipboard);
        let task: Task = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| clipboard.write_text(&text)))
                .unwrap_or_else(|_| {
                    Err(ClipboardError::Rejected(
                        "clipboard backend panicked".to_string(),
                    ))
                });
            match &result {
                Ok(()) => info!("Copied {} bytes of CSS to the clipboard", text.len()),
                Err(e) => warn!("Clipboard write failed: {}", e),
            }
            let _ = tx.send(result);
        });

        self.scheduler
            .schedule(self.publish_delay, task)
            .map_err(PublishError::Schedule)?;
        debug!("Clipboard write scheduled in {:?}", self.publish_delay);
        Ok(Publication { outcome: rx })
    }

    /// `collect` followed by `publish`.
    pub fn collect_and_publish(
        &self,
        document: &dyn StyleSheetList,
    ) -> Result<Publication, PublishError> {
        self.publish(self.collect(document))
    }
}
