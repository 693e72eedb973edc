//! Indicatif progress bar fed by the transcript indexer's watch channels.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

/// Draw one indexing run until `running` flips to false (or its sender is dropped).
///
/// Subscribe `running` before the run can start: a run that already started
/// (or finished) since subscription is seen through the watch version, so the
/// bar is drawn or completed without waiting.
pub async fn track_indexing(mut progress: watch::Receiver<f32>, mut running: watch::Receiver<bool>) {
    let started = running.has_changed().unwrap_or(false) || *running.borrow();
    if !started && running.changed().await.is_err() {
        return;
    }

    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(
        "{spinner:.magenta} indexing transcripts [{bar:30.cyan/blue}] {pos}%",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);

    while *running.borrow_and_update() {
        tokio::select! {
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                bar.set_position(percent(*progress.borrow()));
            }
            changed = running.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    bar.set_position(percent(*progress.borrow()));
    bar.finish_with_message("done");
}

fn percent(fraction: f32) -> u64 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u64
}
