use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = concat!(
    "{msg} {spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} ",
    "{bytes}/{total_bytes} ({bytes_per_sec}, {eta})"
);

const SPINNER_TEMPLATE: &str =
    "{msg} {spinner:.blue} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const PB_CHARS: &str = "█▓▒░  ";

/// Starts one progress display per download attempt.
pub trait ProgressReporter {
    type Handle: ProgressHandle;

    /// `total` is the declared length, `None` when the server did not send one.
    fn begin(&self, label: &str, total: Option<u64>) -> Self::Handle;
}

pub trait ProgressHandle {
    fn advance(&self, delta: u64);
    /// Close after a committed download.
    fn finish(&self);
    /// Close after a failed download, leaving the last position visible.
    fn abandon(&self);
}

/// Terminal progress bar on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarReporter {
    hidden: bool,
}

impl BarReporter {
    /// A reporter that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self { hidden: true }
    }
}

impl ProgressReporter for BarReporter {
    type Handle = ProgressBar;

    fn begin(&self, label: &str, total: Option<u64>) -> ProgressBar {
        let pb = match total {
            Some(len) => ProgressBar::new(len).with_style(style(BAR_TEMPLATE)),
            None => ProgressBar::no_length().with_style(style(SPINNER_TEMPLATE)),
        };
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_message(format!("Downloading {label}"));
        pb
    }
}

fn style(template: &str) -> ProgressStyle {
    match ProgressStyle::with_template(template) {
        Ok(s) => s.progress_chars(PB_CHARS),
        Err(_) => ProgressStyle::default_bar(),
    }
}

impl ProgressHandle for ProgressBar {
    fn advance(&self, delta: u64) {
        self.inc(delta);
    }

    fn finish(&self) {
        ProgressBar::finish(self);
    }

    fn abandon(&self) {
        ProgressBar::abandon(self);
    }
}
